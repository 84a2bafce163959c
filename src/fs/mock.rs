// src/fs/mock.rs

use super::{EntryKind, EntryMeta, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { modified: u64 },
    Dir(Vec<String>), // List of child names
    /// A directory that exists but cannot be opened.
    Unreadable,
}

/// In-memory filesystem for scanner tests.
///
/// Cloning shares the underlying tree, so a test can keep a handle and
/// mutate files while a scanner holds another.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        // Ensure root exists
        files.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            files: Arc::new(Mutex::new(files)),
        }
    }

    /// Create (or update) a file with the given modification time.
    pub fn add_file(&self, path: impl AsRef<Path>, modified: u64) {
        let path = path.as_ref().to_path_buf();
        let mut files = self.files.lock().unwrap();
        files.insert(path.clone(), MockEntry::File { modified });
        Self::link_into_parent(&mut files, &path);
    }

    /// Add a directory that `read_dir` refuses to open.
    pub fn add_unreadable_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut files = self.files.lock().unwrap();
        files.insert(path.clone(), MockEntry::Unreadable);
        Self::link_into_parent(&mut files, &path);
    }

    /// Remove a file (directories are left alone).
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut files = self.files.lock().unwrap();
        if files.remove(path).is_none() {
            return;
        }
        if let (Some(parent), Some(name)) = (parent_of(path), path.file_name()) {
            if let Some(MockEntry::Dir(children)) = files.get_mut(&parent) {
                let name = name.to_string_lossy();
                children.retain(|c| c.as_str() != name);
            }
        }
    }

    fn link_into_parent(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let Some(parent) = parent_of(path) else {
            return;
        };
        if parent == path {
            return;
        }

        if !files.contains_key(&parent) {
            files.insert(parent.clone(), MockEntry::Dir(Vec::new()));
            Self::link_into_parent(files, &parent);
        }

        if let Some(MockEntry::Dir(children)) = files.get_mut(&parent) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if !children.iter().any(|c| c == name) {
                    children.push(name.to_string());
                }
            }
        }
    }
}

fn parent_of(path: &Path) -> Option<PathBuf> {
    path.parent().map(|p| {
        if p.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            p.to_path_buf()
        }
    })
}

impl FileSystem for MockFileSystem {
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            Some(MockEntry::Unreadable) => Err(anyhow!("Permission denied: {:?}", path)),
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }

    fn metadata(&self, path: &Path) -> Result<EntryMeta> {
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::File { modified }) => Ok(EntryMeta {
                kind: EntryKind::File,
                modified: *modified,
            }),
            Some(MockEntry::Dir(_)) | Some(MockEntry::Unreadable) => Ok(EntryMeta {
                kind: EntryKind::Dir,
                modified: 0,
            }),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        // In mock, we just return the path as is, assuming tests use stable paths
        Ok(path.to_path_buf())
    }
}
