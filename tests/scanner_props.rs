use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;

use hotreload::fs::mock::MockFileSystem;
use hotreload::watch::{ScanFilter, SnapshotScanner};

fn dirs() -> impl Strategy<Value = String> {
    "[a-z]{1,5}(/[a-z]{1,5}){0,4}"
}

proptest! {
    #[test]
    fn scanner_counts_exactly_the_matching_files(
        tracked in prop::collection::btree_set((dirs(), "[a-z]{1,6}"), 0..30),
        untracked in prop::collection::btree_set((dirs(), "[a-z]{1,6}\\.(md|mod|txt)"), 0..30),
    ) {
        let fs = MockFileSystem::new();
        let mut expected = BTreeSet::new();
        for (dir, stem) in &tracked {
            let path = format!("./{dir}/{stem}.go");
            fs.add_file(&path, 1);
            expected.insert(path);
        }
        for (dir, name) in &untracked {
            fs.add_file(format!("./{dir}/{name}"), 1);
        }

        let filter = ScanFilter::new(vec![".go".to_string()], &[]).unwrap();
        let snap = SnapshotScanner::new(Arc::new(fs), ".", filter).scan();

        prop_assert_eq!(snap.len(), expected.len());
        for path in &expected {
            prop_assert!(snap.contains(std::path::Path::new(path)));
        }
    }
}
