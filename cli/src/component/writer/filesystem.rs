//! # Directory Layout Writer
//!
//! File: cli/src/component/writer/filesystem.rs
//!
//! Lays a component archive out as a directory tree:
//!
//! ```text
//! <root>/component-descriptor.yaml
//! <root>/<blob name>             (intermediate directories created as needed)
//! ```
//!
//! A missing root is created. An existing root directory is written into; an
//! existing root that is *not* a directory is an error, never silently replaced.
//!
use super::{ArchiveWriter, WriterAction, WriterState};
use crate::common::fs::{io as fsio, join_relative, FileSystem};
use crate::component::descriptor::{ComponentDescriptor, DESCRIPTOR_FILE_NAME};
use crate::core::error::Result;
use anyhow::Context;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::debug;

/// Writes a component archive as a directory tree on a [`FileSystem`].
pub struct DirectoryWriter<'a> {
    fs: &'a dyn FileSystem,
    root: PathBuf,
    state: WriterState,
}

impl<'a> DirectoryWriter<'a> {
    pub fn new(fs: &'a dyn FileSystem, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
            state: WriterState::Unopened,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }
}

impl ArchiveWriter for DirectoryWriter<'_> {
    fn write_descriptor(&mut self, descriptor: &ComponentDescriptor) -> Result<()> {
        self.state.check(WriterAction::WriteDescriptor)?;
        fsio::ensure_dir_exists(self.fs, &self.root)?;
        let path = self.root.join(DESCRIPTOR_FILE_NAME);
        fsio::write_bytes(self.fs, &path, &descriptor.to_yaml()?)?;
        debug!("Wrote descriptor to {:?}", path);
        self.state.advance(WriterAction::WriteDescriptor)
    }

    fn write_blob(&mut self, name: &str, size: u64, content: &mut dyn Read) -> Result<()> {
        self.state.check(WriterAction::WriteBlob)?;
        let path = join_relative(&self.root, name);
        if let Some(parent) = path.parent() {
            fsio::ensure_dir_exists(self.fs, parent)?;
        }
        let mut file = self
            .fs
            .create(&path)
            .with_context(|| format!("Failed to create blob file {:?}", path))?;
        let written = io::copy(&mut content.take(size), &mut file)
            .with_context(|| format!("Failed to write blob file {:?}", path))?;
        if written != size {
            anyhow::bail!(
                "Blob '{}' ended after {} of {} bytes",
                name,
                written,
                size
            );
        }
        file.close()
            .with_context(|| format!("Failed to close blob file {:?}", path))?;
        debug!("Wrote blob '{}' ({} bytes) to {:?}", name, written, path);
        self.state.advance(WriterAction::WriteBlob)
    }

    fn finish(&mut self) -> Result<()> {
        self.state.advance(WriterAction::Finish)
    }
}
