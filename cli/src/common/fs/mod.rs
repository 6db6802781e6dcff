//! # carchive Filesystem Abstraction (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! ## Overview
//!
//! Archive readers, writers and the dispatcher never touch `std::fs` directly.
//! They go through the [`FileSystem`] trait defined here, so the same logic runs
//! against the real disk ([`OsFileSystem`]) or an in-memory tree
//! ([`MemoryFileSystem`]).
//!
//! ## Architecture
//!
//! - **`FileSystem`**: the injectable interface (create/open/stat/size/mkdir/list/rename/remove).
//! - **`FileHandle`**: a writable file with an explicit, fallible `close`.
//!   Dropping a handle also releases it but loses any flush error, so writers
//!   always call `close` and report its result.
//! - **`os`**: `OsFileSystem`, backed by `std::fs` and `walkdir`.
//! - **`memory`**: `MemoryFileSystem`, a cloneable shared in-memory tree.
//! - **`io`**: small helpers layered on top of the trait.
//!
//! All operations return `std::io::Result` so callers can attach their own
//! typed context (`ArchiveError::DestinationUnavailable` etc.).
//!
//! ## Usage
//!
//! ```rust
//! use carchive::common::fs::{FileKind, FileSystem, MemoryFileSystem};
//! use std::io::Write;
//! use std::path::Path;
//!
//! # fn main() -> std::io::Result<()> {
//! let fs = MemoryFileSystem::new();
//! fs.create_dir_all(Path::new("/out"))?;
//! let mut file = fs.create(Path::new("/out/hello.txt"))?;
//! file.write_all(b"hello")?;
//! file.close()?;
//! assert_eq!(fs.stat(Path::new("/out/hello.txt"))?, Some(FileKind::File));
//! # Ok(())
//! # }
//! ```
//!
pub mod io;
pub mod memory;
pub mod os;

pub use memory::MemoryFileSystem;
pub use os::OsFileSystem;

use std::io::{Error, ErrorKind, Read, Result, Write};
use std::path::{Path, PathBuf};

/// What a path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
}

/// A file opened for writing.
pub trait FileHandle: Write + Send {
    /// Flushes buffered data to the backing store and releases the file.
    fn close(self: Box<Self>) -> Result<()>;
}

/// Filesystem operations needed to read and write component archives.
pub trait FileSystem: Send + Sync {
    /// Opens `path` for writing, creating it or truncating existing content.
    /// The parent directory must already exist.
    fn create(&self, path: &Path) -> Result<Box<dyn FileHandle>>;

    /// Opens an existing file for reading.
    fn open(&self, path: &Path) -> Result<Box<dyn Read + Send>>;

    /// `Ok(None)` when nothing exists at `path`.
    fn stat(&self, path: &Path) -> Result<Option<FileKind>>;

    /// Length in bytes of the regular file at `path`.
    fn file_size(&self, path: &Path) -> Result<u64>;

    /// Creates `path` and any missing parents. Succeeds if it already is a directory.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Regular files below `root`, as sorted `/`-separated relative paths.
    fn list_files(&self, root: &Path) -> Result<Vec<String>>;

    /// Moves a file or directory, replacing an existing file at `to`.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    fn remove_file(&self, path: &Path) -> Result<()>;
}

/// Joins a `/`-separated relative name onto `root` component by component.
pub fn join_relative(root: &Path, name: &str) -> PathBuf {
    name.split('/')
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |path, part| path.join(part))
}

/// Renders a relative path as a `/`-separated name. Components that are not
/// valid UTF-8 are an `InvalidData` error rather than being replaced.
pub fn relative_name(relative: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for part in relative.components() {
        match part.as_os_str().to_str() {
            Some(part) => parts.push(part),
            None => {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    format!("file name {:?} is not valid UTF-8", relative),
                ))
            }
        }
    }
    Ok(parts.join("/"))
}
