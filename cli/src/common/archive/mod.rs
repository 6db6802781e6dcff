//! # carchive Archive Utilities Module (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//!
//! ## Overview
//!
//! Format-level building blocks for the stream encodings of a component
//! archive. Nothing here knows about descriptors or blobs; the component
//! writers and readers in `crate::component` combine these pieces.
//!
//! - **`tar`**: deterministic regular-file entries, exact-length content
//!   streaming, and safe entry-name decoding.
//! - **`compression`**: gzip encoder/decoder construction and magic-byte sniffing.
//!
pub mod compression;
pub mod tar;
