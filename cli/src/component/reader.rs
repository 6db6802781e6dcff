//! # Component Archive Reader
//!
//! File: cli/src/component/reader.rs
//!
//! ## Overview
//!
//! Decodes any of the three encodings back into a [`ComponentArchive`]. Each
//! decoder mirrors its writer exactly:
//!
//! - **Directory**: `<root>/component-descriptor.yaml` is the descriptor; every
//!   other regular file below `<root>` is a blob named by its relative path.
//! - **Tar**: the `component-descriptor.yaml` entry is the descriptor; every
//!   other regular-file entry is a blob named by its entry path. Directory
//!   entries are skipped; links and special files are rejected.
//! - **Tar+gzip**: gunzip, then the tar rules.
//!
//! [`read_archive`] detects the encoding on its own: directories are `fs`,
//! files starting with the gzip magic bytes are `tgz`, other files are `tar`.
//!
//! Blobs read back from an archive are held in memory.
//!
use crate::common::archive::compression::{gzip_decoder, is_gzip};
use crate::common::archive::tar::entry_name;
use crate::common::fs::{io as fsio, join_relative, FileKind, FileSystem};
use crate::component::archive::{Blob, ComponentArchive};
use crate::component::descriptor::{ComponentDescriptor, DESCRIPTOR_FILE_NAME};
use crate::component::format::OutputFormat;
use crate::core::error::{ArchiveError, Result};
use anyhow::Context;
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Works out which encoding the archive at `path` uses.
pub fn detect_format(fs: &dyn FileSystem, path: &Path) -> Result<OutputFormat> {
    match fs
        .stat(path)
        .with_context(|| format!("Failed to inspect {:?}", path))?
    {
        None => anyhow::bail!(ArchiveError::InvalidArchive(format!(
            "no component archive found at {:?}",
            path
        ))),
        Some(FileKind::Directory) => Ok(OutputFormat::Filesystem),
        Some(FileKind::File) => {
            let mut reader = BufReader::new(
                fs.open(path)
                    .with_context(|| format!("Failed to open {:?}", path))?,
            );
            let head = reader
                .fill_buf()
                .with_context(|| format!("Failed to read {:?}", path))?;
            if is_gzip(head) {
                Ok(OutputFormat::TarGzip)
            } else {
                Ok(OutputFormat::Tar)
            }
        }
    }
}

/// Reads the archive at `path`, detecting its encoding.
pub fn read_archive(fs: &dyn FileSystem, path: &Path) -> Result<ComponentArchive> {
    let format = detect_format(fs, path)?;
    debug!("Detected {} component archive at {:?}", format, path);
    read_archive_as(fs, path, format)
}

/// Reads the archive at `path` assuming `format`.
pub fn read_archive_as(
    fs: &dyn FileSystem,
    path: &Path,
    format: OutputFormat,
) -> Result<ComponentArchive> {
    let context = || format!("Failed to read component archive {:?}", path);
    match format {
        OutputFormat::Filesystem => from_directory(fs, path).with_context(context),
        OutputFormat::Tar => {
            let input = fs.open(path).with_context(context)?;
            from_tar(input).with_context(context)
        }
        OutputFormat::TarGzip => {
            let input = fs.open(path).with_context(context)?;
            from_tar_gz(input).with_context(context)
        }
    }
}

/// Reads the directory layout rooted at `root`.
pub fn from_directory(fs: &dyn FileSystem, root: &Path) -> Result<ComponentArchive> {
    let files = fs
        .list_files(root)
        .with_context(|| format!("Failed to list files in {:?}", root))?;
    if !files.iter().any(|name| name == DESCRIPTOR_FILE_NAME) {
        anyhow::bail!(ArchiveError::InvalidArchive(format!(
            "{} not found in {:?}",
            DESCRIPTOR_FILE_NAME, root
        )));
    }
    let descriptor =
        ComponentDescriptor::from_yaml(&fsio::read_bytes(fs, &root.join(DESCRIPTOR_FILE_NAME))?)?;
    let mut archive = ComponentArchive::new(descriptor);
    for name in files.into_iter().filter(|name| name != DESCRIPTOR_FILE_NAME) {
        let content = fsio::read_bytes(fs, &join_relative(root, &name))?;
        archive.add_blob(name, Blob::from_bytes(content))?;
    }
    debug!(
        "Read component '{}' with {} blob(s) from directory {:?}",
        archive.descriptor().name(),
        archive.len(),
        root
    );
    Ok(archive)
}

/// Reads an uncompressed tar stream.
pub fn from_tar<R: Read>(input: R) -> Result<ComponentArchive> {
    let mut tar = tar::Archive::new(input);
    let mut descriptor = None;
    let mut blobs = BTreeMap::new();

    for entry in tar.entries().context("Failed to read tar stream")? {
        let mut entry = entry.context("Failed to read tar entry")?;
        let entry_type = entry.header().entry_type();
        if entry_type.is_dir()
            || entry_type.is_pax_global_extensions()
            || entry_type.is_pax_local_extensions()
        {
            continue;
        }
        let name = entry_name(&entry)
            .map_err(|err| ArchiveError::InvalidArchive(err.to_string()))?;
        if !entry_type.is_file() {
            anyhow::bail!(ArchiveError::InvalidArchive(format!(
                "unsupported entry type {:?} for '{}'",
                entry_type, name
            )));
        }

        // The header size is untrusted; grow the buffer only as data arrives.
        let declared = entry.size();
        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .with_context(|| format!("Failed to read tar entry '{}'", name))?;
        if content.len() as u64 != declared {
            anyhow::bail!(ArchiveError::InvalidArchive(format!(
                "entry '{}' is truncated: header declares {} bytes, stream holds {}",
                name,
                declared,
                content.len()
            )));
        }

        if name == DESCRIPTOR_FILE_NAME {
            if descriptor.is_some() {
                anyhow::bail!(ArchiveError::InvalidArchive(format!(
                    "{} appears more than once",
                    DESCRIPTOR_FILE_NAME
                )));
            }
            descriptor = Some(ComponentDescriptor::from_yaml(&content)?);
        } else if blobs.insert(name.clone(), content).is_some() {
            anyhow::bail!(ArchiveError::InvalidArchive(format!(
                "duplicate entry '{}'",
                name
            )));
        }
    }

    let descriptor = descriptor.ok_or_else(|| {
        ArchiveError::InvalidArchive(format!("{} not found in tar stream", DESCRIPTOR_FILE_NAME))
    })?;
    let mut archive = ComponentArchive::new(descriptor);
    for (name, content) in blobs {
        archive.add_blob(name, Blob::from_bytes(content))?;
    }
    debug!(
        "Read component '{}' with {} blob(s) from tar stream",
        archive.descriptor().name(),
        archive.len()
    );
    Ok(archive)
}

/// Reads a gzip-compressed tar stream.
pub fn from_tar_gz<R: Read>(input: R) -> Result<ComponentArchive> {
    from_tar(gzip_decoder(input))
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::archive::tar::append_file;
    use crate::common::fs::MemoryFileSystem;

    fn tar_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, data) in entries {
            append_file(&mut builder, name, data.len() as u64, *data).unwrap();
        }
        builder.into_inner().unwrap()
    }

    const DESCRIPTOR: &[u8] = b"component:\n  name: my-comp\n  version: 1.0.0\n";

    fn assert_invalid_archive(err: anyhow::Error) {
        assert!(
            matches!(
                err.downcast_ref::<ArchiveError>(),
                Some(ArchiveError::InvalidArchive(_))
            ),
            "unexpected error: {:#}",
            err
        );
    }

    #[test]
    fn test_descriptor_may_follow_blobs() -> Result<()> {
        let bytes = tar_with(&[("values.yaml", b"replicas: 3\n"), (DESCRIPTOR_FILE_NAME, DESCRIPTOR)]);
        let archive = from_tar(bytes.as_slice())?;
        assert_eq!(archive.descriptor().name(), "my-comp");
        assert_eq!(archive.blob_names(), vec!["values.yaml"]);
        Ok(())
    }

    #[test]
    fn test_missing_descriptor() {
        let bytes = tar_with(&[("values.yaml", b"replicas: 3\n")]);
        assert_invalid_archive(from_tar(bytes.as_slice()).unwrap_err());
    }

    #[test]
    fn test_duplicate_entries() {
        let bytes = tar_with(&[
            (DESCRIPTOR_FILE_NAME, DESCRIPTOR),
            ("values.yaml", b"a"),
            ("values.yaml", b"b"),
        ]);
        assert_invalid_archive(from_tar(bytes.as_slice()).unwrap_err());

        let bytes = tar_with(&[(DESCRIPTOR_FILE_NAME, DESCRIPTOR), (DESCRIPTOR_FILE_NAME, DESCRIPTOR)]);
        assert_invalid_archive(from_tar(bytes.as_slice()).unwrap_err());
    }

    #[test]
    fn test_symlink_entries_are_rejected() {
        let mut builder = tar::Builder::new(Vec::new());
        append_file(&mut builder, DESCRIPTOR_FILE_NAME, DESCRIPTOR.len() as u64, DESCRIPTOR)
            .unwrap();
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Symlink);
        header.set_size(0);
        builder
            .append_link(&mut header, "link", "values.yaml")
            .unwrap();
        let bytes = builder.into_inner().unwrap();
        assert_invalid_archive(from_tar(bytes.as_slice()).unwrap_err());
    }

    #[test]
    fn test_directory_entries_are_skipped() -> Result<()> {
        let mut builder = tar::Builder::new(Vec::new());
        let mut dir = tar::Header::new_gnu();
        dir.set_entry_type(tar::EntryType::Directory);
        dir.set_mode(0o755);
        dir.set_size(0);
        builder.append_data(&mut dir, "charts/", std::io::empty())?;
        append_file(&mut builder, DESCRIPTOR_FILE_NAME, DESCRIPTOR.len() as u64, DESCRIPTOR)?;
        append_file(&mut builder, "charts/app.tgz", 3, &b"abc"[..])?;
        let bytes = builder.into_inner()?;

        let archive = from_tar(bytes.as_slice())?;
        assert_eq!(archive.blob_names(), vec!["charts/app.tgz"]);
        Ok(())
    }

    fn oversized_entry() -> Vec<u8> {
        let mut header = tar::Header::new_gnu();
        header.set_path("values.yaml").unwrap();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_mode(0o644);
        header.set_size(1 << 46);
        header.set_cksum();
        let mut bytes = header.as_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 1024]);
        bytes
    }

    #[test]
    fn test_oversized_entry_size_is_truncation() {
        assert_invalid_archive(from_tar(oversized_entry().as_slice()).unwrap_err());

        let mut encoder = crate::common::archive::compression::gzip_encoder(Vec::new(), 6);
        std::io::Write::write_all(&mut encoder, &oversized_entry()).unwrap();
        let compressed = encoder.finish().unwrap();
        assert_invalid_archive(from_tar_gz(compressed.as_slice()).unwrap_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_entry_name_is_invalid() {
        let mut header = crate::common::archive::tar::regular_file_header(1);
        let raw = b"bad\xff.bin";
        header.as_old_mut().name[..raw.len()].copy_from_slice(raw);
        header.set_cksum();
        let mut builder = tar::Builder::new(Vec::new());
        append_file(&mut builder, DESCRIPTOR_FILE_NAME, DESCRIPTOR.len() as u64, DESCRIPTOR)
            .unwrap();
        builder.append(&header, &b"x"[..]).unwrap();
        let bytes = builder.into_inner().unwrap();
        assert_invalid_archive(from_tar(bytes.as_slice()).unwrap_err());
    }

    #[test]
    fn test_not_a_tar_stream() {
        assert!(from_tar(&b"definitely not a tar archive"[..]).is_err());
        assert!(from_tar_gz(&b"\x1f\x8b garbage"[..]).is_err());
    }

    #[test]
    fn test_detect_format() -> Result<()> {
        let fs = MemoryFileSystem::new();
        fs.create_dir_all(Path::new("/dir"))?;
        fsio::write_bytes(&fs, Path::new("/plain.tar"), &tar_with(&[]))?;
        fsio::write_bytes(&fs, Path::new("/packed.tgz"), &[0x1f, 0x8b, 0x08, 0x00])?;

        assert_eq!(detect_format(&fs, Path::new("/dir"))?, OutputFormat::Filesystem);
        assert_eq!(detect_format(&fs, Path::new("/plain.tar"))?, OutputFormat::Tar);
        assert_eq!(detect_format(&fs, Path::new("/packed.tgz"))?, OutputFormat::TarGzip);
        assert_invalid_archive(detect_format(&fs, Path::new("/missing")).unwrap_err());
        Ok(())
    }

    #[test]
    fn test_directory_without_descriptor() -> Result<()> {
        let fs = MemoryFileSystem::new();
        fsio::write_bytes(&fs, Path::new("/ca/values.yaml"), b"x")?;
        assert_invalid_archive(from_directory(&fs, Path::new("/ca")).unwrap_err());
        Ok(())
    }
}
