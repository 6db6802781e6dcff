//! # Component Archives (`component`)
//!
//! File: cli/src/component/mod.rs
//!
//! ## Overview
//!
//! A component archive is a component descriptor plus the named blobs its
//! resources refer to. This module holds the in-memory model and everything
//! needed to persist it and load it back.
//!
//! ## Architecture
//!
//! - **`descriptor`**: the `component-descriptor.yaml` model (serde + YAML).
//! - **`archive`**: `ComponentArchive` and `Blob`, the unit that gets written.
//! - **`format`**: the `fs` / `tar` / `tgz` vocabulary, validation and the
//!   reusable `--format` flag.
//! - **`writer`**: one `ArchiveWriter` per format, driven by `encode`.
//! - **`dispatch`**: `write` / `write_as`, the single entry point that picks a
//!   writer, opens and closes the destination and maps failures to
//!   `ArchiveError`.
//! - **`reader`**: the inverse of the writers, with format detection.
//!
//! ## Usage
//!
//! ```rust
//! use carchive::common::fs::MemoryFileSystem;
//! use carchive::component::{read_archive, write, Blob, ComponentArchive, ComponentDescriptor};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let fs = MemoryFileSystem::new();
//! let mut archive = ComponentArchive::new(ComponentDescriptor::new("my-comp", "1.0.0"));
//! archive.add_blob("values.yaml", Blob::from_bytes("replicas: 3\n"))?;
//!
//! write(&fs, Path::new("/my-comp.tgz"), &archive, "tgz")?;
//! let loaded = read_archive(&fs, Path::new("/my-comp.tgz"))?;
//! assert_eq!(loaded.blob_names(), vec!["values.yaml"]);
//! # Ok(())
//! # }
//! ```
//!
pub mod archive;
pub mod descriptor;
pub mod dispatch;
pub mod format;
pub mod reader;
pub mod writer;

pub use self::archive::{Blob, ComponentArchive};
pub use self::descriptor::ComponentDescriptor;
pub use self::dispatch::{write, write_as, WriteOptions};
pub use self::format::{validate_output_format, FormatArg, OutputFormat};
pub use self::reader::{detect_format, read_archive};
