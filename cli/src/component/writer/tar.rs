//! # Tar Stream Writer
//!
//! File: cli/src/component/writer/tar.rs
//!
//! Emits a component archive as one uncompressed tar stream: the descriptor
//! entry (`component-descriptor.yaml`) first, then one regular-file entry per
//! blob named after the blob. Every header carries the exact content length,
//! so blob sizes are determined before the content is streamed.
//!
//! `finish` writes the tar trailer. The underlying writer is *not* closed;
//! retrieve it with [`TarWriter::into_inner`] and close it yourself.
//!
use super::{ArchiveWriter, WriterAction, WriterState};
use crate::common::archive::tar::append_file;
use crate::component::descriptor::{ComponentDescriptor, DESCRIPTOR_FILE_NAME};
use crate::core::error::{ArchiveError, Result};
use anyhow::Context;
use std::io::{Read, Write};
use tar::Builder;
use tracing::debug;

/// Writes a component archive as a tar stream into `W`.
pub struct TarWriter<W: Write> {
    builder: Builder<W>,
    state: WriterState,
}

impl<W: Write> TarWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            builder: Builder::new(inner),
            state: WriterState::Unopened,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Mutable access to the underlying writer, e.g. to finish an outer encoder.
    pub fn get_mut(&mut self) -> &mut W {
        self.builder.get_mut()
    }

    /// Returns the underlying writer. Only valid once the archive is finalized.
    pub fn into_inner(self) -> Result<W> {
        if self.state != WriterState::Finalized {
            anyhow::bail!(ArchiveError::InvalidWriterState {
                state: "the archive is not finalized",
                action: "release the output stream",
            });
        }
        self.builder
            .into_inner()
            .context("Failed to release tar output stream")
    }
}

impl<W: Write> ArchiveWriter for TarWriter<W> {
    fn write_descriptor(&mut self, descriptor: &ComponentDescriptor) -> Result<()> {
        self.state.check(WriterAction::WriteDescriptor)?;
        let yaml = descriptor.to_yaml()?;
        append_file(
            &mut self.builder,
            DESCRIPTOR_FILE_NAME,
            yaml.len() as u64,
            yaml.as_slice(),
        )
        .with_context(|| format!("Failed to add {} to tar stream", DESCRIPTOR_FILE_NAME))?;
        debug!("Added tar entry {} ({} bytes)", DESCRIPTOR_FILE_NAME, yaml.len());
        self.state.advance(WriterAction::WriteDescriptor)
    }

    fn write_blob(&mut self, name: &str, size: u64, content: &mut dyn Read) -> Result<()> {
        self.state.check(WriterAction::WriteBlob)?;
        append_file(&mut self.builder, name, size, content)
            .with_context(|| format!("Failed to add blob '{}' to tar stream", name))?;
        debug!("Added tar entry {} ({} bytes)", name, size);
        self.state.advance(WriterAction::WriteBlob)
    }

    fn finish(&mut self) -> Result<()> {
        self.state.check(WriterAction::Finish)?;
        self.builder
            .finish()
            .context("Failed to write tar trailer")?;
        self.state.advance(WriterAction::Finish)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::fs::{MemoryFileSystem, OsFileSystem};
    use crate::component::archive::{Blob, ComponentArchive};
    use crate::component::writer::encode;
    use tar::Archive;

    #[test]
    fn test_descriptor_first_then_sorted_blobs() -> Result<()> {
        let mut archive = ComponentArchive::new(ComponentDescriptor::new("my-comp", "1.0.0"));
        archive.add_blob("values.yaml", Blob::from_bytes("replicas: 3\n"))?;
        archive.add_blob("b/chart.tgz", Blob::from_bytes(vec![1u8, 2, 3]))?;

        let mut writer = TarWriter::new(Vec::new());
        encode(&MemoryFileSystem::new(), &archive, &mut writer)?;
        let bytes = writer.into_inner()?;

        let mut tar = Archive::new(bytes.as_slice());
        let mut seen = Vec::new();
        for entry in tar.entries()? {
            let mut entry = entry?;
            let name = entry.path()?.to_string_lossy().into_owned();
            let mut content = Vec::new();
            entry.read_to_end(&mut content)?;
            assert_eq!(entry.header().size()?, content.len() as u64);
            seen.push((name, content));
        }
        let names: Vec<&str> = seen.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(
            names,
            vec![DESCRIPTOR_FILE_NAME, "b/chart.tgz", "values.yaml"]
        );
        assert_eq!(seen[2].1, b"replicas: 3\n");
        Ok(())
    }

    #[test]
    fn test_finish_twice_is_rejected() -> Result<()> {
        let mut writer = TarWriter::new(Vec::new());
        writer.write_descriptor(&ComponentDescriptor::new("my-comp", "1.0.0"))?;
        writer.finish()?;
        let err = writer.finish().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ArchiveError>(),
            Some(ArchiveError::InvalidWriterState { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_into_inner_requires_finalized() {
        let writer = TarWriter::new(Vec::new());
        assert!(writer.into_inner().is_err());
    }

    #[test]
    fn test_missing_file_blob_fails() -> Result<()> {
        let mut archive = ComponentArchive::new(ComponentDescriptor::new("my-comp", "1.0.0"));
        archive.add_blob("gone.bin", Blob::from_file("/definitely/not/here.bin"))?;
        let mut writer = TarWriter::new(Vec::new());
        let err = encode(&OsFileSystem::new(), &archive, &mut writer).unwrap_err();
        assert!(format!("{:#}", err).contains("gone.bin"));
        assert_eq!(writer.state(), WriterState::DescriptorWritten);
        Ok(())
    }

    #[test]
    fn test_short_blob_content_fails() -> Result<()> {
        let mut writer = TarWriter::new(Vec::new());
        writer.write_descriptor(&ComponentDescriptor::new("my-comp", "1.0.0"))?;
        let err = writer
            .write_blob("values.yaml", 20, &mut "replicas: 3\n".as_bytes())
            .unwrap_err();
        assert!(format!("{:#}", err).contains("values.yaml"));
        assert_eq!(writer.state(), WriterState::DescriptorWritten);
        Ok(())
    }
}
