#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub use hotreload_test_utils::builders;
pub use hotreload_test_utils::{
    init_tracing, with_timeout, FakeBackendHandle, FakeProcessBackend, StaticResolver,
};

/// Write `contents` to `root/rel` (creating parents) and pin its mtime to
/// `secs` since the epoch.
pub fn write_with_mtime(root: &Path, rel: &str, contents: &str, secs: u64) -> std::io::Result<()> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, contents)?;
    set_mtime(&path, secs)
}

pub fn set_mtime(path: &Path, secs: u64) -> std::io::Result<()> {
    let file = fs::OpenOptions::new().write(true).open(path)?;
    file.set_modified(epoch_plus(secs))
}

fn epoch_plus(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}
