use std::collections::BTreeMap;
use std::path::PathBuf;

use proptest::prelude::*;

use hotreload::watch::{changed, ChangeSummary, FileSnapshot};

fn to_snapshot(map: &BTreeMap<String, u64>) -> FileSnapshot {
    map.iter().map(|(p, t)| (PathBuf::from(p), *t)).collect()
}

fn tree() -> impl Strategy<Value = BTreeMap<String, u64>> {
    prop::collection::btree_map("[a-z]{1,6}(/[a-z]{1,6}){0,3}\\.go", 0u64..10_000, 1..24)
}

proptest! {
    #[test]
    fn identical_snapshots_never_change(map in tree()) {
        let a = to_snapshot(&map);
        let b = to_snapshot(&map);
        prop_assert!(!changed(&a, &b));
        prop_assert_eq!(ChangeSummary::between(&a, &b).total(), 0);
    }

    #[test]
    fn a_single_mtime_bump_is_detected(map in tree(), pick in any::<prop::sample::Index>(), bump in 1u64..1_000) {
        let old = to_snapshot(&map);

        let mut edited = map.clone();
        let key = pick.get(&map.keys().cloned().collect::<Vec<_>>()).clone();
        if let Some(t) = edited.get_mut(&key) {
            *t += bump;
        }
        let new = to_snapshot(&edited);

        prop_assert!(changed(&old, &new));
        prop_assert_eq!(ChangeSummary::between(&old, &new).modified, vec![PathBuf::from(key)]);
    }

    #[test]
    fn a_removed_file_is_detected(map in tree(), pick in any::<prop::sample::Index>()) {
        let old = to_snapshot(&map);

        let mut shrunk = map.clone();
        let key = pick.get(&map.keys().cloned().collect::<Vec<_>>()).clone();
        shrunk.remove(&key);
        let new = to_snapshot(&shrunk);

        prop_assert!(changed(&old, &new));
        prop_assert!(changed(&new, &old));
        prop_assert_eq!(ChangeSummary::between(&old, &new).removed, vec![PathBuf::from(key)]);
    }

    #[test]
    fn a_rename_with_same_size_is_detected(map in tree(), pick in any::<prop::sample::Index>()) {
        let old = to_snapshot(&map);

        let mut renamed = map.clone();
        let key = pick.get(&map.keys().cloned().collect::<Vec<_>>()).clone();
        let mtime = renamed.remove(&key).unwrap_or_default();
        // Upper-case names are outside the generator's alphabet.
        renamed.insert("RENAMED.go".to_string(), mtime);
        let new = to_snapshot(&renamed);

        prop_assert_eq!(old.len(), new.len());
        prop_assert!(changed(&old, &new));
    }
}
