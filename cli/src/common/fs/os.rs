//! # OS Filesystem Backend
//!
//! File: cli/src/common/fs/os.rs
//!
//! [`FileSystem`] implementation backed by the host filesystem. Written files
//! go through a `BufWriter`; `close` flushes it and calls `sync_all`, so data
//! that never reached stable storage shows up as an error instead of a
//! silently truncated archive.
//!
use super::{relative_name, FileHandle, FileKind, FileSystem};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// The host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl OsFileSystem {
    pub fn new() -> Self {
        Self
    }
}

struct OsFile {
    writer: BufWriter<File>,
}

impl Write for OsFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl FileHandle for OsFile {
    fn close(self: Box<Self>) -> io::Result<()> {
        let file = self.writer.into_inner().map_err(|err| err.into_error())?;
        file.sync_all()
    }
}

impl FileSystem for OsFileSystem {
    fn create(&self, path: &Path) -> io::Result<Box<dyn FileHandle>> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        debug!("Opened {:?} for writing", path);
        Ok(Box::new(OsFile {
            writer: BufWriter::new(file),
        }))
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(path)?))
    }

    fn stat(&self, path: &Path) -> io::Result<Option<FileKind>> {
        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => Ok(Some(FileKind::Directory)),
            Ok(_) => Ok(Some(FileKind::File)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn file_size(&self, path: &Path) -> io::Result<u64> {
        let meta = fs::metadata(path)?;
        if meta.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{}: is a directory", path.display()),
            ));
        }
        Ok(meta.len())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn list_files(&self, root: &Path) -> io::Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
            files.push(relative_name(relative)?);
        }
        files.sort();
        Ok(files)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}
