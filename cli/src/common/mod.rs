//! # carchive Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Format-agnostic plumbing used by the component archive code. Nothing in
//! here knows what a component descriptor is.
//!
//! - **`archive`**: deterministic tar headers and entry helpers, gzip setup.
//! - **`fs`**: the injectable `FileSystem` trait, its OS and in-memory
//!   backends, and small I/O helpers on top of it.
//!

/// Tar and gzip helpers.
pub mod archive;
/// Filesystem abstraction and helpers.
pub mod fs;
