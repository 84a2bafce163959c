// src/watch/changes.rs

use std::path::PathBuf;

use crate::watch::snapshot::FileSnapshot;

/// Report whether the tracked tree differs between two snapshots.
///
/// The size comparison must come first: a file removed between scans is only
/// caught by it, since the per-path loop walks `new`.
pub fn changed(old: &FileSnapshot, new: &FileSnapshot) -> bool {
    if old.len() != new.len() {
        return true;
    }
    new.iter().any(|(path, mtime)| old.get(path) != Some(mtime))
}

/// Which paths were added, removed or modified between two snapshots.
///
/// Only used for logging; [`changed`] is the decision function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    pub added: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
}

impl ChangeSummary {
    pub fn between(old: &FileSnapshot, new: &FileSnapshot) -> Self {
        let mut summary = Self::default();
        for (path, mtime) in new.iter() {
            match old.get(path) {
                None => summary.added.push(path.to_path_buf()),
                Some(prev) if prev != mtime => summary.modified.push(path.to_path_buf()),
                Some(_) => {}
            }
        }
        summary.removed = old
            .iter()
            .filter(|(path, _)| !new.contains(path))
            .map(|(path, _)| path.to_path_buf())
            .collect();
        summary
    }

    pub fn total(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }
}
