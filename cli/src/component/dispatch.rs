//! # Component Archive Dispatcher
//!
//! File: cli/src/component/dispatch.rs
//!
//! ## Overview
//!
//! Single entry point for persisting a [`ComponentArchive`]: given a format, a
//! destination and a [`FileSystem`], pick the matching writer and report
//! failures uniformly.
//!
//! ## Flow
//!
//! 1. The format is (re-)validated. An invalid token fails with
//!    `UnsupportedFormat` before anything is touched.
//! 2. `fs`: the `DirectoryWriter` writes below the destination directory.
//!    Any failure is wrapped as `EncodingFailed`.
//! 3. `tar` / `tgz`: the destination is created (or truncated) as one file.
//!    Failing to open it is `DestinationUnavailable`; failing while encoding
//!    is `EncodingFailed`. After the writer has finalized its stream the file
//!    is closed explicitly, and a failing close is `CloseFailed`; buffered
//!    data may not have reached storage, so it is never ignored.
//!
//! Without [`WriteOptions::atomic`] a failed write can leave a partial file or
//! directory at the destination; nothing is cleaned up. With it, stream
//! formats are written to a sibling `.<name>.partial` file that is renamed
//! over the destination only after a successful close, and removed on failure.
//!
use crate::common::archive::compression::DEFAULT_COMPRESSION_LEVEL;
use crate::common::fs::{FileHandle, FileSystem};
use crate::component::archive::ComponentArchive;
use crate::component::format::{validate_output_format, OutputFormat};
use crate::component::writer::{encode, DirectoryWriter, TarGzWriter, TarWriter};
use crate::core::error::{ArchiveError, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Knobs for a single write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Gzip level for `tgz`, 0..=9.
    pub compression_level: u32,
    /// Write stream formats to a temporary sibling and rename on success.
    pub atomic: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            atomic: false,
        }
    }
}

/// Writes `archive` to `path` in the format named by the token `format`.
///
/// The token must be one of `fs`, `tar`, `tgz`; anything else (including the
/// empty string) fails with `ArchiveError::UnsupportedFormat` and creates nothing.
pub fn write(
    fs: &dyn FileSystem,
    path: &Path,
    archive: &ComponentArchive,
    format: &str,
) -> Result<()> {
    let format = match validate_output_format(format, false)? {
        Some(format) => format,
        None => anyhow::bail!(ArchiveError::UnsupportedFormat {
            value: format.to_string()
        }),
    };
    write_as(fs, path, archive, format, &WriteOptions::default())
}

/// Writes `archive` to `path` as `format`.
pub fn write_as(
    fs: &dyn FileSystem,
    path: &Path,
    archive: &ComponentArchive,
    format: OutputFormat,
    options: &WriteOptions,
) -> Result<()> {
    info!(
        "Writing component archive '{}:{}' as {} to {:?}",
        archive.descriptor().name(),
        archive.descriptor().version(),
        format,
        path
    );
    match format {
        OutputFormat::Filesystem => {
            if options.atomic {
                debug!("Atomic replacement applies to stream formats only; writing {:?} in place", path);
            }
            let mut writer = DirectoryWriter::new(fs, path);
            encode(fs, archive, &mut writer).with_context(|| ArchiveError::EncodingFailed {
                path: path.to_path_buf(),
            })
        }
        OutputFormat::Tar => write_stream(fs, path, options, |out| {
            let mut writer = TarWriter::new(out);
            encode(fs, archive, &mut writer)?;
            writer.into_inner().map(drop)
        }),
        OutputFormat::TarGzip => write_stream(fs, path, options, |out| {
            let mut writer = TarGzWriter::new(out, options.compression_level);
            encode(fs, archive, &mut writer)?;
            writer.into_inner().map(drop)
        }),
    }
}

/// Sibling path used while an atomic write is in progress.
pub fn partial_path(path: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        anyhow::anyhow!("destination has no file name").context(
            ArchiveError::DestinationUnavailable {
                path: path.to_path_buf(),
            },
        )
    })?;
    Ok(path.with_file_name(format!(".{}.partial", file_name.to_string_lossy())))
}

fn write_stream<F>(fs: &dyn FileSystem, path: &Path, options: &WriteOptions, encode_into: F) -> Result<()>
where
    F: FnOnce(&mut Box<dyn FileHandle>) -> Result<()>,
{
    let target = if options.atomic {
        partial_path(path)?
    } else {
        path.to_path_buf()
    };
    debug!("Opening {:?} for writing", target);
    let mut out = fs
        .create(&target)
        .with_context(|| ArchiveError::DestinationUnavailable {
            path: target.clone(),
        })?;

    let result = encode_into(&mut out)
        .with_context(|| ArchiveError::EncodingFailed {
            path: path.to_path_buf(),
        })
        .and_then(|()| {
            out.close().with_context(|| ArchiveError::CloseFailed {
                path: path.to_path_buf(),
            })
        });

    if !options.atomic {
        return result;
    }
    match result.and_then(|()| {
        fs.rename(&target, path)
            .with_context(|| ArchiveError::DestinationUnavailable {
                path: path.to_path_buf(),
            })
    }) {
        Ok(()) => {
            debug!("Moved {:?} into place at {:?}", target, path);
            Ok(())
        }
        Err(err) => {
            if let Err(cleanup) = fs.remove_file(&target) {
                warn!("Failed to remove partial archive {:?}: {}", target, cleanup);
            }
            Err(err)
        }
    }
}
