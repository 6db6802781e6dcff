//! # Component Archive Writers
//!
//! File: cli/src/component/writer/mod.rs
//!
//! ## Overview
//!
//! Every archive encoding implements the same capability, [`ArchiveWriter`]:
//! write the descriptor, write each blob, finalize. The dispatcher picks an
//! implementation by `OutputFormat`; [`encode`] drives any of them.
//!
//! Writers receive blob content as an already-opened reader of known length.
//! [`encode`] resolves each [`Blob`] through the caller's `FileSystem`, so
//! file-backed blobs are read from the same filesystem the archive is written to.
//!
//! [`Blob`]: crate::component::archive::Blob
//!
//! - **`filesystem`**: `DirectoryWriter`, a directory tree on a `FileSystem`.
//! - **`tar`**: `TarWriter`, one uncompressed tar stream into any `Write`.
//! - **`tgz`**: `TarGzWriter`, the same tar stream piped through gzip.
//!
//! ## Writer state machine
//!
//! ```text
//! Unopened --descriptor--> DescriptorWritten --blob--> BlobsWritten --finish--> Finalized
//!                                  |                    ^     |
//!                                  |                    +blob-+
//!                                  +------------------finish-------------------^
//! ```
//!
//! Any other call (a blob before the descriptor, a second descriptor,
//! finishing twice) fails with `ArchiveError::InvalidWriterState` and leaves
//! the writer untouched.
//!
pub mod filesystem;
pub mod tar;
pub mod tgz;

pub use self::filesystem::DirectoryWriter;
pub use self::tar::TarWriter;
pub use self::tgz::TarGzWriter;

use crate::common::fs::FileSystem;
use crate::component::archive::ComponentArchive;
use crate::component::descriptor::ComponentDescriptor;
use crate::core::error::{ArchiveError, Result};
use anyhow::Context;
use std::io::Read;
use tracing::debug;

/// Encodes a component archive in one concrete layout.
pub trait ArchiveWriter {
    /// Writes the descriptor. Must be called first, exactly once.
    fn write_descriptor(&mut self, descriptor: &ComponentDescriptor) -> Result<()>;

    /// Writes one blob of exactly `size` bytes read from `content`.
    /// Only valid after the descriptor.
    fn write_blob(&mut self, name: &str, size: u64, content: &mut dyn Read) -> Result<()>;

    /// Completes the encoding (tar trailer, gzip footer, ...). Exactly once.
    fn finish(&mut self) -> Result<()>;
}

/// Where a writer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Unopened,
    DescriptorWritten,
    BlobsWritten,
    Finalized,
}

/// A call that moves a writer between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterAction {
    WriteDescriptor,
    WriteBlob,
    Finish,
}

impl WriterAction {
    fn describe(self) -> &'static str {
        match self {
            WriterAction::WriteDescriptor => "write the descriptor",
            WriterAction::WriteBlob => "add a blob",
            WriterAction::Finish => "finalize",
        }
    }
}

impl WriterState {
    fn describe(self) -> &'static str {
        match self {
            WriterState::Unopened => "no descriptor has been written",
            WriterState::DescriptorWritten => "the descriptor is already written",
            WriterState::BlobsWritten => "blobs are being written",
            WriterState::Finalized => "the archive is finalized",
        }
    }

    /// The state after `action`, or `InvalidWriterState` if the move is not allowed.
    pub fn next(self, action: WriterAction) -> Result<WriterState> {
        use WriterAction::*;
        use WriterState::*;
        match (self, action) {
            (Unopened, WriteDescriptor) => Ok(DescriptorWritten),
            (DescriptorWritten | BlobsWritten, WriteBlob) => Ok(BlobsWritten),
            (DescriptorWritten | BlobsWritten, Finish) => Ok(Finalized),
            (state, action) => Err(ArchiveError::InvalidWriterState {
                state: state.describe(),
                action: action.describe(),
            }
            .into()),
        }
    }

    /// Checks `action` without changing the state; call [`WriterState::advance`]
    /// once the action's I/O has succeeded.
    pub fn check(self, action: WriterAction) -> Result<()> {
        self.next(action).map(|_| ())
    }

    pub fn advance(&mut self, action: WriterAction) -> Result<()> {
        *self = self.next(action)?;
        Ok(())
    }
}

/// Writes `archive` through `writer`: descriptor, blobs in sorted name order, finish.
/// File-backed blobs are read through `fs`.
pub fn encode(
    fs: &dyn FileSystem,
    archive: &ComponentArchive,
    writer: &mut dyn ArchiveWriter,
) -> Result<()> {
    writer.write_descriptor(archive.descriptor())?;
    for (name, blob) in archive.blobs() {
        let size = blob
            .size(fs)
            .with_context(|| format!("Failed to determine size of blob '{}'", name))?;
        let mut content = blob
            .open(fs)
            .with_context(|| format!("Failed to open content of blob '{}'", name))?;
        writer.write_blob(name, size, &mut content)?;
    }
    writer.finish()?;
    debug!(
        "Encoded component '{}' with {} blob(s)",
        archive.descriptor().name(),
        archive.len()
    );
    Ok(())
}
