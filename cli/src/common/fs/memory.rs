//! # In-Memory Filesystem Backend
//!
//! File: cli/src/common/fs/memory.rs
//!
//! [`MemoryFileSystem`] keeps a tree of directories and files in a shared map.
//! Clones share the same tree, so a test can hand one clone to the code under
//! test and inspect the result through another.
//!
//! The rules mirror a POSIX filesystem closely enough for archive I/O:
//! `create` needs an existing parent directory, a file cannot be used as a
//! directory, and a directory cannot be opened as a file. Written bytes are
//! visible as soon as they are written, so an unclosed or failed write leaves
//! a partial file behind exactly like the OS backend would.
//!
use super::{relative_name, FileHandle, FileKind, FileSystem};
use std::collections::BTreeMap;
use std::io::{self, Cursor, Read, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
enum Node {
    Directory,
    File(Vec<u8>),
}

type Tree = BTreeMap<PathBuf, Node>;

/// A shared, in-memory directory tree.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    nodes: Arc<Mutex<Tree>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn tree(&self) -> MutexGuard<'_, Tree> {
        self.nodes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|part| !matches!(part, Component::CurDir))
        .collect()
}

fn is_root(path: &Path) -> bool {
    path.parent().is_none()
}

fn kind_of(tree: &Tree, path: &Path) -> Option<FileKind> {
    if is_root(path) {
        return Some(FileKind::Directory);
    }
    match tree.get(path) {
        Some(Node::Directory) => Some(FileKind::Directory),
        Some(Node::File(_)) => Some(FileKind::File),
        None => None,
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: no such file or directory", path.display()),
    )
}

fn not_a_directory(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::Other,
        format!("{}: not a directory", path.display()),
    )
}

fn is_a_directory(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::Other,
        format!("{}: is a directory", path.display()),
    )
}

/// Fails unless the parent of `path` exists and is a directory.
fn require_parent(tree: &Tree, path: &Path) -> io::Result<()> {
    match path.parent() {
        None => Ok(()),
        Some(parent) => match kind_of(tree, parent) {
            Some(FileKind::Directory) => Ok(()),
            Some(FileKind::File) => Err(not_a_directory(parent)),
            None => Err(not_found(parent)),
        },
    }
}

struct MemoryFile {
    nodes: Arc<Mutex<Tree>>,
    path: PathBuf,
}

impl Write for MemoryFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut tree = self.nodes.lock().unwrap_or_else(PoisonError::into_inner);
        match tree.get_mut(&self.path) {
            Some(Node::File(content)) => {
                content.extend_from_slice(buf);
                Ok(buf.len())
            }
            _ => Err(not_found(&self.path)),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FileHandle for MemoryFile {
    fn close(self: Box<Self>) -> io::Result<()> {
        Ok(())
    }
}

impl FileSystem for MemoryFileSystem {
    fn create(&self, path: &Path) -> io::Result<Box<dyn FileHandle>> {
        let path = normalize(path);
        let mut tree = self.tree();
        if is_root(&path) {
            return Err(is_a_directory(&path));
        }
        require_parent(&tree, &path)?;
        if let Some(Node::Directory) = tree.get(&path) {
            return Err(is_a_directory(&path));
        }
        tree.insert(path.clone(), Node::File(Vec::new()));
        Ok(Box::new(MemoryFile {
            nodes: Arc::clone(&self.nodes),
            path,
        }))
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        let path = normalize(path);
        let tree = self.tree();
        match tree.get(&path) {
            Some(Node::File(content)) => Ok(Box::new(Cursor::new(content.clone()))),
            Some(Node::Directory) => Err(is_a_directory(&path)),
            None if is_root(&path) => Err(is_a_directory(&path)),
            None => Err(not_found(&path)),
        }
    }

    fn stat(&self, path: &Path) -> io::Result<Option<FileKind>> {
        let path = normalize(path);
        Ok(kind_of(&self.tree(), &path))
    }

    fn file_size(&self, path: &Path) -> io::Result<u64> {
        let path = normalize(path);
        match self.tree().get(&path) {
            Some(Node::File(content)) => Ok(content.len() as u64),
            Some(Node::Directory) => Err(is_a_directory(&path)),
            None if is_root(&path) => Err(is_a_directory(&path)),
            None => Err(not_found(&path)),
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let path = normalize(path);
        let mut tree = self.tree();
        let mut ancestors: Vec<&Path> = path.ancestors().filter(|p| !is_root(p)).collect();
        ancestors.reverse();
        for dir in ancestors {
            match tree.get(dir) {
                Some(Node::Directory) => {}
                Some(Node::File(_)) => return Err(not_a_directory(dir)),
                None => {
                    tree.insert(dir.to_path_buf(), Node::Directory);
                }
            }
        }
        Ok(())
    }

    fn list_files(&self, root: &Path) -> io::Result<Vec<String>> {
        let root = normalize(root);
        let tree = self.tree();
        match kind_of(&tree, &root) {
            Some(FileKind::Directory) => {}
            Some(FileKind::File) => return Err(not_a_directory(&root)),
            None => return Err(not_found(&root)),
        }
        let mut files = Vec::new();
        for (path, node) in tree.iter() {
            if !matches!(node, Node::File(_)) {
                continue;
            }
            if let Ok(relative) = path.strip_prefix(&root) {
                let name = relative_name(relative)?;
                if !name.is_empty() {
                    files.push(name);
                }
            }
        }
        files.sort();
        Ok(files)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let from = normalize(from);
        let to = normalize(to);
        let mut tree = self.tree();
        require_parent(&tree, &to)?;
        match tree.get(&from).cloned() {
            None => Err(not_found(&from)),
            Some(Node::File(content)) => {
                if let Some(Node::Directory) = tree.get(&to) {
                    return Err(is_a_directory(&to));
                }
                tree.remove(&from);
                tree.insert(to, Node::File(content));
                Ok(())
            }
            Some(Node::Directory) => {
                if tree.contains_key(&to) {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("{}: already exists", to.display()),
                    ));
                }
                let moved: Vec<PathBuf> = tree
                    .keys()
                    .filter(|path| path.starts_with(&from))
                    .cloned()
                    .collect();
                for old in moved {
                    if let Some(node) = tree.remove(&old) {
                        let suffix = old.strip_prefix(&from).unwrap_or(Path::new(""));
                        tree.insert(to.join(suffix), node);
                    }
                }
                Ok(())
            }
        }
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let path = normalize(path);
        let mut tree = self.tree();
        match tree.get(&path) {
            Some(Node::File(_)) => {
                tree.remove(&path);
                Ok(())
            }
            Some(Node::Directory) => Err(is_a_directory(&path)),
            None => Err(not_found(&path)),
        }
    }
}
