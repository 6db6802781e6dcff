//! # Component Archive and Blobs
//!
//! File: cli/src/component/archive.rs
//!
//! ## Overview
//!
//! A [`ComponentArchive`] is exactly one [`ComponentDescriptor`] plus a set of
//! named [`Blob`]s. Blob names are relative `/`-separated paths that are
//! unique within the archive; they become file paths in the directory layout
//! and entry names in the tar layouts.
//!
//! Blobs are kept in a `BTreeMap`, so iteration (and therefore the entry order
//! of every encoding) is sorted by name and byte-for-byte reproducible.
//!
//! A blob's content is either held in memory or streamed from a file at write
//! time, so large files never have to be loaded up front. File-backed blobs
//! only record a path; their content is read through whichever [`FileSystem`]
//! the archive is written or inspected with.
//!
use crate::common::fs::FileSystem;
use crate::component::descriptor::{ComponentDescriptor, DESCRIPTOR_FILE_NAME};
use crate::core::error::{ArchiveError, Result};
use std::collections::BTreeMap;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

/// Named content stored in a component archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    source: BlobSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BlobSource {
    Memory(Vec<u8>),
    File(PathBuf),
}

impl Blob {
    /// A blob whose content is already in memory.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: BlobSource::Memory(bytes.into()),
        }
    }

    /// A blob streamed from the file at `path` when the archive is written.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: BlobSource::File(path.into()),
        }
    }

    /// Path backing the blob, if it is file-backed.
    pub fn file_path(&self) -> Option<&Path> {
        match &self.source {
            BlobSource::Memory(_) => None,
            BlobSource::File(path) => Some(path),
        }
    }

    /// Length of the content in bytes. `fs` is only consulted for file-backed blobs.
    pub fn size(&self, fs: &dyn FileSystem) -> io::Result<u64> {
        match &self.source {
            BlobSource::Memory(bytes) => Ok(bytes.len() as u64),
            BlobSource::File(path) => fs.file_size(path),
        }
    }

    /// Opens the content for reading.
    pub fn open(&self, fs: &dyn FileSystem) -> io::Result<Box<dyn Read + '_>> {
        match &self.source {
            BlobSource::Memory(bytes) => Ok(Box::new(Cursor::new(bytes.as_slice()))),
            BlobSource::File(path) => {
                let file: Box<dyn Read + '_> = fs.open(path)?;
                Ok(file)
            }
        }
    }

    /// Reads the whole content into memory.
    pub fn to_bytes(&self, fs: &dyn FileSystem) -> io::Result<Vec<u8>> {
        match &self.source {
            BlobSource::Memory(bytes) => Ok(bytes.clone()),
            BlobSource::File(_) => {
                let mut content = Vec::new();
                self.open(fs)?.read_to_end(&mut content)?;
                Ok(content)
            }
        }
    }
}

/// One descriptor plus uniquely named blobs.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentArchive {
    descriptor: ComponentDescriptor,
    blobs: BTreeMap<String, Blob>,
}

impl ComponentArchive {
    pub fn new(descriptor: ComponentDescriptor) -> Self {
        Self {
            descriptor,
            blobs: BTreeMap::new(),
        }
    }

    pub fn descriptor(&self) -> &ComponentDescriptor {
        &self.descriptor
    }

    /// Adds a blob under `name`.
    ///
    /// Fails with `ArchiveError::InvalidArchive` if the name is not a safe
    /// relative path, collides with the descriptor file, is already taken, or
    /// would need to be both a file and a directory alongside another blob.
    pub fn add_blob(&mut self, name: impl Into<String>, blob: Blob) -> Result<()> {
        let name = name.into();
        validate_blob_name(&name)?;
        if self.blobs.contains_key(&name) {
            anyhow::bail!(ArchiveError::InvalidArchive(format!(
                "duplicate blob name '{}'",
                name
            )));
        }
        if let Some(other) = self.blobs.keys().find(|other| nested(other, &name)) {
            anyhow::bail!(ArchiveError::InvalidArchive(format!(
                "blob '{}' conflicts with blob '{}': a path cannot be both a file and a directory",
                name, other
            )));
        }
        self.blobs.insert(name, blob);
        Ok(())
    }

    pub fn blob(&self, name: &str) -> Option<&Blob> {
        self.blobs.get(name)
    }

    /// Blobs in sorted name order.
    pub fn blobs(&self) -> impl Iterator<Item = (&str, &Blob)> {
        self.blobs.iter().map(|(name, blob)| (name.as_str(), blob))
    }

    pub fn blob_names(&self) -> Vec<&str> {
        self.blobs.keys().map(String::as_str).collect()
    }

    /// Number of blobs (the descriptor is not counted).
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

/// True when one name is a directory prefix of the other (`a` vs `a/b`).
fn nested(a: &str, b: &str) -> bool {
    fn is_dir_prefix(prefix: &str, name: &str) -> bool {
        name.len() > prefix.len()
            && name.starts_with(prefix)
            && name.as_bytes()[prefix.len()] == b'/'
    }
    is_dir_prefix(a, b) || is_dir_prefix(b, a)
}

/// Checks that `name` is usable both as a tar entry name and as a relative
/// file path: non-empty `/`-separated normal components only.
pub fn validate_blob_name(name: &str) -> Result<()> {
    let reject = |reason: &str| -> Result<()> {
        anyhow::bail!(ArchiveError::InvalidArchive(format!(
            "invalid blob name '{}': {}",
            name, reason
        )))
    };

    if name.is_empty() {
        return reject("name is empty");
    }
    if name.starts_with('/') {
        return reject("name must be relative");
    }
    if name.contains('\\') {
        return reject("use '/' as the path separator");
    }
    if name.contains('\0') {
        return reject("name contains a NUL byte");
    }
    for component in name.split('/') {
        match component {
            "" => return reject("name contains an empty path component"),
            "." | ".." => return reject("name contains '.' or '..'"),
            _ => {}
        }
    }
    if name == DESCRIPTOR_FILE_NAME {
        return reject("name is reserved for the component descriptor");
    }
    Ok(())
}
