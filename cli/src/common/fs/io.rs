//! # carchive Filesystem I/O Helpers
//!
//! File: cli/src/common/fs/io.rs
//!
//! ## Overview
//!
//! Small helpers layered on the [`FileSystem`] trait for patterns that repeat
//! across the archive writers and readers:
//! - **`ensure_dir_exists`**: creates a directory (and parents) when missing, and
//!   refuses to proceed when the path exists but is not a directory.
//! - **`read_bytes`**: reads a whole file, with the path in the error context.
//! - **`write_bytes`**: writes a whole file (parents created first) and closes it,
//!   reporting close errors.
//!
use crate::common::fs::{FileKind, FileSystem};
use crate::core::error::{ArchiveError, Result};
use anyhow::Context;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// Ensures that a directory exists at `path`, creating it and its parents if needed.
///
/// # Errors
///
/// Returns an `Err` if:
/// - The path exists but is not a directory (`ArchiveError::DestinationUnavailable`
///   with the cause in the chain).
/// - Creating the directory fails.
pub fn ensure_dir_exists(fs: &dyn FileSystem, path: &Path) -> Result<()> {
    match fs
        .stat(path)
        .with_context(|| format!("Failed to inspect {:?}", path))?
    {
        None => {
            fs.create_dir_all(path)
                .with_context(|| format!("Failed to create directory {:?}", path))?;
            info!("Created directory: {:?}", path);
        }
        Some(FileKind::File) => {
            return Err(anyhow::anyhow!("path exists but is not a directory: {:?}", path)
                .context(ArchiveError::DestinationUnavailable {
                    path: path.to_path_buf(),
                }));
        }
        Some(FileKind::Directory) => {
            debug!("Directory already exists: {:?}", path);
        }
    }
    Ok(())
}

/// Reads the entire content of a file.
pub fn read_bytes(fs: &dyn FileSystem, path: &Path) -> Result<Vec<u8>> {
    let mut content = Vec::new();
    fs.open(path)
        .and_then(|mut file| file.read_to_end(&mut content))
        .with_context(|| format!("Failed to read file {:?}", path))?;
    Ok(content)
}

/// Writes `content` to `path`, creating parent directories, then closes the file.
pub fn write_bytes(fs: &dyn FileSystem, path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir_exists(fs, parent)?;
    }
    let mut file = fs
        .create(path)
        .with_context(|| format!("Failed to create file {:?}", path))?;
    file.write_all(content)
        .with_context(|| format!("Failed to write file {:?}", path))?;
    file.close()
        .with_context(|| format!("Failed to close file {:?}", path))?;
    debug!("Wrote {} bytes to {:?}", content.len(), path);
    Ok(())
}
