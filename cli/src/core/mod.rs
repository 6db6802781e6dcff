//! # carchive Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! Foundational pieces shared by the library and the CLI:
//!
//! - `config`: Configuration loading, merging, and validation
//! - `error`: The `ArchiveError` type and the crate-wide `Result` alias
//!
//! ```rust
//! use carchive::core::config; // For loading configuration
//! use carchive::core::error::{ArchiveError, Result}; // For error handling
//! ```
//!
pub mod config;
pub mod error;
