//! # carchive TAR Plumbing (`common::archive::tar`)
//!
//! File: cli/src/common/archive/tar.rs
//!
//! ## Overview
//!
//! Format-level helpers on top of the `tar` crate, shared by the component
//! archive tar writer and reader:
//!
//! - [`append_file`] writes one regular-file entry with a deterministic header
//!   (GNU format, mode `0644`, uid/gid 0, mtime 0). Two archives with the same
//!   entries in the same order are byte-identical.
//! - [`ExactReader`] guarantees that an entry's content is exactly as long as
//!   the size already written into its header. A tar header must carry the
//!   size before the content, so a source that turns out shorter (a file
//!   truncated while being archived) fails the write instead of silently
//!   corrupting the stream.
//! - [`entry_name`] turns an entry path back into a `/`-separated name and
//!   rejects absolute paths, `..` components and names that are not UTF-8.
//!
use std::io::{self, Read, Write};
use std::path::Component;
use tar::{Builder, Entry, EntryType, Header};

/// Permission bits written for every regular file entry.
pub const FILE_MODE: u32 = 0o644;

/// Header for a regular file of `size` bytes with no host-specific metadata.
pub fn regular_file_header(size: u64) -> Header {
    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Regular);
    header.set_size(size);
    header.set_mode(FILE_MODE);
    header.set_uid(0);
    header.set_gid(0);
    header.set_mtime(0);
    header
}

/// Appends a regular file entry named `name` with exactly `size` bytes read from `data`.
pub fn append_file<W: Write, R: Read>(
    builder: &mut Builder<W>,
    name: &str,
    size: u64,
    data: R,
) -> io::Result<()> {
    let mut header = regular_file_header(size);
    let mut reader = ExactReader::new(data, size);
    builder.append_data(&mut header, name, &mut reader)?;
    reader.finish()
}

/// Reader adapter yielding exactly `expected` bytes from `inner`.
///
/// Reading stops at `expected` bytes even if `inner` has more; hitting EOF
/// early is reported as `ErrorKind::UnexpectedEof`.
pub struct ExactReader<R> {
    inner: R,
    expected: u64,
    remaining: u64,
}

impl<R: Read> ExactReader<R> {
    pub fn new(inner: R, expected: u64) -> Self {
        Self {
            inner,
            expected,
            remaining: expected,
        }
    }

    /// Fails if the consumer stopped before all expected bytes were delivered.
    pub fn finish(&self) -> io::Result<()> {
        if self.remaining == 0 {
            Ok(())
        } else {
            Err(self.short_read())
        }
    }

    fn short_read(&self) -> io::Error {
        io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "content ended after {} of {} bytes",
                self.expected - self.remaining,
                self.expected
            ),
        )
    }
}

impl<R: Read> Read for ExactReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let limit = buf.len().min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        let read = self.inner.read(&mut buf[..limit])?;
        if read == 0 {
            return Err(self.short_read());
        }
        self.remaining -= read as u64;
        Ok(read)
    }
}

/// The entry's path as a `/`-separated relative name.
pub fn entry_name<R: Read>(entry: &Entry<'_, R>) -> io::Result<String> {
    let path = entry.path()?;
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => match part.to_str() {
                Some(part) => parts.push(part.to_owned()),
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("entry path {:?} is not valid UTF-8", path),
                    ))
                }
            },
            Component::CurDir => {}
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("unsafe entry path {:?}", path),
                ))
            }
        }
    }
    Ok(parts.join("/"))
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tar::Archive;

    fn build(entries: &[(&str, &[u8])]) -> io::Result<Vec<u8>> {
        let mut builder = Builder::new(Vec::new());
        for (name, data) in entries {
            append_file(&mut builder, name, data.len() as u64, *data)?;
        }
        builder.into_inner()
    }

    #[test]
    fn test_append_file_is_deterministic() -> io::Result<()> {
        let first = build(&[("a.txt", b"alpha"), ("dir/b.txt", b"beta")])?;
        let second = build(&[("a.txt", b"alpha"), ("dir/b.txt", b"beta")])?;
        assert_eq!(first, second);

        let mut archive = Archive::new(first.as_slice());
        for entry in archive.entries()? {
            let entry = entry?;
            assert_eq!(entry.header().mode()?, FILE_MODE);
            assert_eq!(entry.header().mtime()?, 0);
            assert_eq!(entry.header().uid()?, 0);
        }
        Ok(())
    }

    #[test]
    fn test_short_source_fails() {
        let mut builder = Builder::new(Vec::new());
        let err = append_file(&mut builder, "short.txt", 10, &b"abc"[..]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_exact_reader_stops_at_expected_size() -> io::Result<()> {
        let mut reader = ExactReader::new(&b"abcdef"[..], 4);
        let mut out = Vec::new();
        reader.read_to_end(&mut out)?;
        assert_eq!(out, b"abcd");
        reader.finish()
    }

    #[test]
    fn test_entry_name_round_trip() -> io::Result<()> {
        let data = build(&[("charts/app/values.yaml", b"x")])?;
        let mut archive = Archive::new(data.as_slice());
        let entry = archive.entries()?.next().expect("one entry")?;
        assert_eq!(entry_name(&entry)?, "charts/app/values.yaml");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_entry_name_rejects_non_utf8() -> io::Result<()> {
        let mut header = regular_file_header(1);
        let raw = b"bad\xff.txt";
        header.as_old_mut().name[..raw.len()].copy_from_slice(raw);
        header.set_cksum();
        let mut builder = Builder::new(Vec::new());
        builder.append(&header, &b"x"[..])?;
        let data = builder.into_inner()?;

        let mut archive = Archive::new(data.as_slice());
        let entry = archive.entries()?.next().expect("one entry")?;
        let err = entry_name(&entry).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        Ok(())
    }
}
