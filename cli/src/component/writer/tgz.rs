//! # Gzip-Compressed Tar Writer
//!
//! File: cli/src/component/writer/tgz.rs
//!
//! Same entries as [`TarWriter`], piped through a gzip encoder. Finalizing
//! runs strictly inside-out: tar trailer first, then the gzip footer. The
//! destination itself is closed by whoever owns it, after `into_inner`.
//!
use super::{ArchiveWriter, TarWriter, WriterState};
use crate::common::archive::compression::gzip_encoder;
use crate::component::descriptor::ComponentDescriptor;
use crate::core::error::Result;
use anyhow::Context;
use flate2::write::GzEncoder;
use std::io::{Read, Write};

/// Writes a component archive as a gzip-compressed tar stream into `W`.
pub struct TarGzWriter<W: Write> {
    tar: TarWriter<GzEncoder<W>>,
}

impl<W: Write> TarGzWriter<W> {
    /// `level` is the gzip compression level, 0 (none) to 9 (best).
    pub fn new(inner: W, level: u32) -> Self {
        Self {
            tar: TarWriter::new(gzip_encoder(inner, level)),
        }
    }

    pub fn state(&self) -> WriterState {
        self.tar.state()
    }

    /// Returns the underlying writer. Only valid once the archive is finalized.
    pub fn into_inner(self) -> Result<W> {
        let encoder = self.tar.into_inner()?;
        encoder.finish().context("Failed to finish gzip stream")
    }
}

impl<W: Write> ArchiveWriter for TarGzWriter<W> {
    fn write_descriptor(&mut self, descriptor: &ComponentDescriptor) -> Result<()> {
        self.tar.write_descriptor(descriptor)
    }

    fn write_blob(&mut self, name: &str, size: u64, content: &mut dyn Read) -> Result<()> {
        self.tar.write_blob(name, size, content)
    }

    fn finish(&mut self) -> Result<()> {
        self.tar.finish()?;
        self.tar
            .get_mut()
            .try_finish()
            .context("Failed to finish gzip stream")
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::archive::compression::{gzip_decoder, is_gzip};
    use crate::common::fs::MemoryFileSystem;
    use crate::component::archive::{Blob, ComponentArchive};
    use crate::component::writer::encode;

    fn sample_archive() -> ComponentArchive {
        let mut archive = ComponentArchive::new(ComponentDescriptor::new("my-comp", "1.0.0"));
        archive
            .add_blob("values.yaml", Blob::from_bytes("replicas: 3\n"))
            .unwrap();
        archive
    }

    fn tar_bytes(archive: &ComponentArchive) -> Result<Vec<u8>> {
        let mut writer = TarWriter::new(Vec::new());
        encode(&MemoryFileSystem::new(), archive, &mut writer)?;
        writer.into_inner()
    }

    #[test]
    fn test_gzip_wraps_the_plain_tar_stream() -> Result<()> {
        let archive = sample_archive();
        let mut writer = TarGzWriter::new(Vec::new(), 6);
        encode(&MemoryFileSystem::new(), &archive, &mut writer)?;
        let compressed = writer.into_inner()?;
        assert!(is_gzip(&compressed));

        let mut decompressed = Vec::new();
        gzip_decoder(compressed.as_slice()).read_to_end(&mut decompressed)?;
        assert_eq!(decompressed, tar_bytes(&archive)?);
        Ok(())
    }

    #[test]
    fn test_finish_completes_gzip_before_release() -> Result<()> {
        let mut writer = TarGzWriter::new(Vec::new(), 1);
        encode(&MemoryFileSystem::new(), &sample_archive(), &mut writer)?;
        // The gzip footer is already written by `finish`; the buffer holds a
        // complete stream even before `into_inner`.
        let snapshot = writer.tar.get_mut().get_ref().clone();
        let mut decompressed = Vec::new();
        gzip_decoder(snapshot.as_slice()).read_to_end(&mut decompressed)?;
        assert!(!decompressed.is_empty());
        assert_eq!(writer.into_inner()?, snapshot);
        Ok(())
    }
}
