// src/watch/patterns.rs

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::WatchConfig;

/// Decides which entries of the watched tree take part in a snapshot.
///
/// - Files are tracked when their name ends with one of the configured
///   extensions and their root-relative path is not excluded.
/// - Directories are pruned when their root-relative path is excluded, so
///   `exclude = ["vendor", ".git"]` skips those subtrees entirely.
///
/// Exclude patterns are globs evaluated against forward-slash paths relative
/// to the watch root (e.g. `"vendor/**"` or `"**/*_test.go"`).
#[derive(Clone)]
pub struct ScanFilter {
    extensions: Vec<String>,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for ScanFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanFilter")
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

impl ScanFilter {
    /// Build a filter; `extensions` are used as plain suffixes.
    pub fn new(extensions: Vec<String>, exclude: &[String]) -> Result<Self> {
        Ok(Self {
            extensions,
            exclude_set: compile_globset(exclude)?,
        })
    }

    pub fn from_config(cfg: &WatchConfig) -> Result<Self> {
        Self::new(cfg.extensions.clone(), &cfg.exclude)
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Whether a regular file at `rel_path` belongs in the snapshot.
    pub fn tracks_file(&self, rel_path: &str) -> bool {
        let name = rel_path.rsplit('/').next().unwrap_or(rel_path);
        if !self.extensions.iter().any(|ext| name.ends_with(ext.as_str())) {
            return false;
        }
        !self.is_excluded(rel_path)
    }

    /// Whether the scan should descend into the directory at `rel_path`.
    pub fn enters_dir(&self, rel_path: &str) -> bool {
        rel_path.is_empty() || !self.is_excluded(rel_path)
    }

    fn is_excluded(&self, rel_path: &str) -> bool {
        self.exclude_set
            .as_ref()
            .is_some_and(|set| set.is_match(rel_path))
    }
}

fn compile_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .with_context(|| format!("invalid exclude glob pattern: {pattern}"))?;
        builder.add(glob);
    }

    let set = builder.build().context("building exclude glob set")?;
    Ok(Some(set))
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns the full path (lossy) when `path` is not under `root`; exclude
/// patterns then simply do not match it.
pub fn relative_str(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}
