// src/watch/snapshot.rs

//! Polling snapshot of the watched source tree.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::fs::{EntryKind, FileSystem};
use crate::watch::patterns::{relative_str, ScanFilter};

/// Path -> last-modified time (seconds since epoch) for every tracked file.
///
/// Built fresh by each [`SnapshotScanner::scan`] and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSnapshot {
    entries: BTreeMap<PathBuf, u64>,
}

impl FileSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &Path) -> Option<u64> {
        self.entries.get(path).copied()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, u64)> + '_ {
        self.entries.iter().map(|(p, t)| (p.as_path(), *t))
    }
}

impl FromIterator<(PathBuf, u64)> for FileSnapshot {
    fn from_iter<I: IntoIterator<Item = (PathBuf, u64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Walks the tree under `root` and records the tracked files.
///
/// The walk uses an explicit work-list, so deep trees cost heap rather than
/// stack. It is best-effort: directories or entries that cannot be read
/// (permissions, deleted mid-scan) are skipped. Symlinks are classified by
/// what they point at; a directory reached twice through links is only
/// walked once.
#[derive(Debug, Clone)]
pub struct SnapshotScanner {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    filter: ScanFilter,
}

impl SnapshotScanner {
    pub fn new(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>, filter: ScanFilter) -> Self {
        Self {
            fs,
            root: root.into(),
            filter,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn filter(&self) -> &ScanFilter {
        &self.filter
    }

    pub fn scan(&self) -> FileSnapshot {
        let mut entries = BTreeMap::new();
        let mut visited: HashSet<PathBuf> = HashSet::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let key = self.fs.canonicalize(&dir).unwrap_or_else(|_| dir.clone());
            if !visited.insert(key) {
                trace!(?dir, "directory already scanned; skipping");
                continue;
            }

            let children = match self.fs.read_dir(&dir) {
                Ok(children) => children,
                Err(err) => {
                    trace!(?dir, error = %err, "cannot open directory; skipping");
                    continue;
                }
            };

            for path in children {
                let meta = match self.fs.metadata(&path) {
                    Ok(meta) => meta,
                    Err(err) => {
                        trace!(?path, error = %err, "cannot stat entry; skipping");
                        continue;
                    }
                };

                let rel = relative_str(&self.root, &path);
                match meta.kind {
                    EntryKind::Dir => {
                        if self.filter.enters_dir(&rel) {
                            pending.push(path);
                        }
                    }
                    EntryKind::File => {
                        if self.filter.tracks_file(&rel) {
                            entries.insert(path, meta.modified);
                        }
                    }
                    EntryKind::Other => {}
                }
            }
        }

        debug!(root = ?self.root, files = entries.len(), "snapshot taken");
        FileSnapshot { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn scanner(fs: &MockFileSystem, exclude: &[&str]) -> SnapshotScanner {
        let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
        let filter = ScanFilter::new(vec![".go".to_string()], &exclude).unwrap();
        SnapshotScanner::new(Arc::new(fs.clone()), ".", filter)
    }

    #[test]
    fn counts_matching_files_at_any_depth() {
        let fs = MockFileSystem::new();
        fs.add_file("./main.go", 10);
        fs.add_file("./internal/server/server.go", 11);
        fs.add_file("./internal/handlers/room/list.go", 12);
        fs.add_file("./a/b/c/d/e/f/g/deep.go", 13);
        fs.add_file("./go.mod", 14);
        fs.add_file("./internal/README.md", 15);

        let snap = scanner(&fs, &[]).scan();

        assert_eq!(snap.len(), 4);
        assert_eq!(snap.get(Path::new("./a/b/c/d/e/f/g/deep.go")), Some(13));
        assert!(!snap.contains(Path::new("./go.mod")));
    }

    #[test]
    fn unreadable_directories_are_skipped() {
        let fs = MockFileSystem::new();
        fs.add_file("./main.go", 1);
        fs.add_unreadable_dir("./locked");

        let snap = scanner(&fs, &[]).scan();
        assert_eq!(snap.len(), 1);
    }

    #[test]
    fn missing_root_yields_empty_snapshot() {
        let fs = MockFileSystem::new();
        let filter = ScanFilter::new(vec![".go".to_string()], &[]).unwrap();
        let scanner = SnapshotScanner::new(Arc::new(fs), "./does-not-exist", filter);

        assert!(scanner.scan().is_empty());
    }

    #[test]
    fn excluded_directories_are_not_walked() {
        let fs = MockFileSystem::new();
        fs.add_file("./main.go", 1);
        fs.add_file("./vendor/lib/lib.go", 2);

        let snap = scanner(&fs, &["vendor"]).scan();
        assert_eq!(snap.len(), 1);
        assert!(snap.contains(Path::new("./main.go")));
    }

    #[test]
    fn rescan_reflects_new_modification_times() {
        let fs = MockFileSystem::new();
        fs.add_file("./main.go", 1);
        let scanner = scanner(&fs, &[]);

        let before = scanner.scan();
        fs.add_file("./main.go", 2);
        let after = scanner.scan();

        assert_eq!(before.get(Path::new("./main.go")), Some(1));
        assert_eq!(after.get(Path::new("./main.go")), Some(2));
    }

    #[test]
    fn scanner_exposes_its_filter() {
        let fs = MockFileSystem::new();
        let scanner = scanner(&fs, &[]);

        assert_eq!(scanner.filter().extensions(), &[".go".to_string()]);
        assert!(scanner.filter().tracks_file("cmd/api/main.go"));
    }
}
