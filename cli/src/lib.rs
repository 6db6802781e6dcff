//! # carchive
//!
//! File: cli/src/lib.rs
//!
//! ## Overview
//!
//! Library half of the `carchive` tool: serializes component archives (a
//! component descriptor plus its local blobs) to a plain directory, a tar
//! file or a gzip-compressed tar file, and reads them back.
//!
//! The binary in `main.rs` is a thin clap front end over this crate.
//!
pub mod common;
pub mod component;
pub mod core;
