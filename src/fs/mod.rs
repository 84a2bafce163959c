// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};

pub mod mock;

/// What a directory entry resolves to (symlinks are followed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    /// Sockets, fifos, devices: never tracked.
    Other,
}

/// The subset of `stat` the scanner cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMeta {
    pub kind: EntryKind,
    /// Last modification, whole seconds since the Unix epoch.
    pub modified: u64,
}

/// Abstract read-only filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    /// Return the entries of a directory as full paths.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Metadata of the entry at `path`, following symlinks.
    fn metadata(&self, path: &Path) -> Result<EntryMeta>;

    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        // Entries that vanish or fail mid-listing are dropped, not the whole dir.
        let entries = fs::read_dir(path)
            .with_context(|| format!("reading dir {:?}", path))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .collect();
        Ok(entries)
    }

    fn metadata(&self, path: &Path) -> Result<EntryMeta> {
        let meta = fs::metadata(path).with_context(|| format!("stat {:?}", path))?;

        let kind = if meta.is_dir() {
            EntryKind::Dir
        } else if meta.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };

        // Timestamps before the epoch collapse to 0.
        let modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Ok(EntryMeta { kind, modified })
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).with_context(|| format!("canonicalizing {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_dir_lists_every_entry_as_a_full_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.go"), "package main").unwrap();
        fs::create_dir(dir.path().join("internal")).unwrap();

        let mut entries = RealFileSystem.read_dir(dir.path()).unwrap();
        entries.sort();

        assert_eq!(
            entries,
            vec![dir.path().join("internal"), dir.path().join("main.go")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn dangling_link_does_not_hide_its_siblings() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.go"), "package main").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.go"), dir.path().join("stale.go"))
            .unwrap();

        let entries = RealFileSystem.read_dir(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);

        // The link itself fails to stat; its sibling is still usable.
        assert!(RealFileSystem.metadata(&dir.path().join("stale.go")).is_err());
        let meta = RealFileSystem.metadata(&dir.path().join("main.go")).unwrap();
        assert_eq!(meta.kind, EntryKind::File);
    }

    #[test]
    fn missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RealFileSystem.read_dir(&dir.path().join("nope")).is_err());
    }
}
