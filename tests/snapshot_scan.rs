mod common;

use std::error::Error;
use std::fs;
use std::sync::Arc;

use tempfile::tempdir;

use hotreload::fs::RealFileSystem;
use hotreload::watch::{changed, ChangeSummary, ScanFilter, SnapshotScanner};

use crate::common::{set_mtime, write_with_mtime};

type TestResult = Result<(), Box<dyn Error>>;

fn go_scanner(root: &std::path::Path, exclude: &[&str]) -> Result<SnapshotScanner, Box<dyn Error>> {
    let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
    let filter = ScanFilter::new(vec![".go".to_string()], &exclude)?;
    Ok(SnapshotScanner::new(Arc::new(RealFileSystem), root, filter))
}

#[test]
fn only_matching_files_are_tracked() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path();

    write_with_mtime(root, "main.go", "package main", 100)?;
    write_with_mtime(root, "internal/server/server.go", "package server", 100)?;
    write_with_mtime(root, "internal/a/b/c/d/deep.go", "package d", 100)?;
    write_with_mtime(root, "go.mod", "module x", 100)?;
    write_with_mtime(root, "docs/README.md", "# x", 100)?;

    let snap = go_scanner(root, &[])?.scan();

    assert_eq!(snap.len(), 3);
    assert_eq!(snap.get(&root.join("internal/a/b/c/d/deep.go")), Some(100));
    assert!(!snap.contains(&root.join("go.mod")));

    Ok(())
}

#[test]
fn empty_tree_gives_empty_snapshot() -> TestResult {
    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("cmd/api"))?;

    let snap = go_scanner(dir.path(), &[])?.scan();
    assert!(snap.is_empty());

    Ok(())
}

#[test]
fn excluded_subtrees_are_ignored() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path();

    write_with_mtime(root, "main.go", "", 1)?;
    write_with_mtime(root, "vendor/github.com/x/x.go", "", 1)?;
    write_with_mtime(root, "server/server_test.go", "", 1)?;

    let snap = go_scanner(root, &["vendor", "**/*_test.go"])?.scan();

    assert_eq!(snap.len(), 1);
    assert!(snap.contains(&root.join("main.go")));

    Ok(())
}

#[test]
fn touching_a_file_is_a_change() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path();
    write_with_mtime(root, "main.go", "package main", 1_000)?;
    write_with_mtime(root, "util.go", "package main", 1_000)?;

    let scanner = go_scanner(root, &[])?;
    let before = scanner.scan();
    assert!(!changed(&before, &scanner.scan()));

    set_mtime(&root.join("util.go"), 2_000)?;
    let after = scanner.scan();

    assert!(changed(&before, &after));
    let summary = ChangeSummary::between(&before, &after);
    assert_eq!(summary.modified, vec![root.join("util.go")]);
    assert!(summary.added.is_empty());
    assert!(summary.removed.is_empty());

    Ok(())
}

#[test]
fn adding_and_deleting_files_are_changes() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path();
    write_with_mtime(root, "main.go", "", 5)?;

    let scanner = go_scanner(root, &[])?;
    let base = scanner.scan();

    write_with_mtime(root, "handlers/room.go", "", 5)?;
    let added = scanner.scan();
    assert!(changed(&base, &added));

    fs::remove_file(root.join("handlers/room.go"))?;
    let removed = scanner.scan();
    assert!(changed(&added, &removed));
    assert!(!changed(&base, &removed));

    Ok(())
}

#[cfg(unix)]
#[test]
fn symlink_cycles_terminate() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path();
    write_with_mtime(root, "pkg/a.go", "", 1)?;
    std::os::unix::fs::symlink(root, root.join("pkg/loop"))?;

    let snap = go_scanner(root, &[])?.scan();

    // The root is walked once; the link back into it adds nothing.
    assert_eq!(snap.len(), 1);
    Ok(())
}
