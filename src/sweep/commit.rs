// src/sweep/commit.rs

//! Persisting the installed snapshot after deletion

use super::executor::DeletionOutcome;
use crate::error::Result;
use crate::snapshot::SnapshotStore;
use crate::snapshot::models::InstalledItem;
use std::collections::HashSet;
use tracing::info;

/// The installed list minus every successfully removed candidate
///
/// Entries are matched on the whole record, so a failed candidate is kept
/// even if another entry with the same identifier was removed.
pub fn retain_survivors(
    installed: &[InstalledItem],
    outcomes: &[DeletionOutcome],
) -> Vec<InstalledItem> {
    let removed: HashSet<&InstalledItem> = outcomes
        .iter()
        .filter(|o| o.succeeded)
        .map(|o| &o.candidate)
        .collect();

    installed
        .iter()
        .filter(|item| !removed.contains(item))
        .cloned()
        .collect()
}

/// Replace the installed snapshot with the survivors
pub fn commit(
    store: &SnapshotStore,
    installed: &[InstalledItem],
    outcomes: &[DeletionOutcome],
) -> Result<Vec<InstalledItem>> {
    let retained = retain_survivors(installed, outcomes);
    store.save_installed(&retained)?;
    info!(
        "Installed snapshot updated: {} of {} item(s) retained",
        retained.len(),
        installed.len()
    );
    Ok(retained)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::models::ModId;
    use tempfile::TempDir;

    fn item(id: u64, key: &str) -> InstalledItem {
        InstalledItem::new(ModId::from(id), key)
    }

    fn outcome(candidate: InstalledItem, succeeded: bool) -> DeletionOutcome {
        DeletionOutcome {
            candidate,
            succeeded,
            error_detail: (!succeeded).then(|| "failed".to_string()),
        }
    }

    #[test]
    fn test_successes_are_dropped() {
        let installed = vec![item(1, "a"), item(2, "b"), item(3, "c")];
        let outcomes = vec![outcome(item(3, "c"), true)];
        assert_eq!(
            retain_survivors(&installed, &outcomes),
            vec![item(1, "a"), item(2, "b")]
        );
    }

    #[test]
    fn test_failures_are_retained() {
        let installed = vec![item(1, "a"), item(2, "b")];
        let outcomes = vec![outcome(item(1, "a"), false), outcome(item(2, "b"), true)];
        assert_eq!(retain_survivors(&installed, &outcomes), vec![item(1, "a")]);
    }

    #[test]
    fn test_same_identifier_different_key() {
        let installed = vec![item(4, "old"), item(4, "new")];
        let outcomes = vec![outcome(item(4, "old"), true), outcome(item(4, "new"), false)];
        assert_eq!(retain_survivors(&installed, &outcomes), vec![item(4, "new")]);
    }

    #[test]
    fn test_retained_is_subset_of_original() {
        let installed = vec![item(1, "a"), item(2, "b")];
        let outcomes = vec![outcome(item(9, "z"), true)];
        let retained = retain_survivors(&installed, &outcomes);
        assert!(retained.iter().all(|r| installed.contains(r)));
        assert_eq!(retained, installed);
    }

    #[test]
    fn test_commit_rewrites_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        let installed = vec![item(1, "a"), item(2, "b")];
        store.save_installed(&installed).unwrap();

        let retained = commit(&store, &installed, &[outcome(item(2, "b"), true)]).unwrap();
        assert_eq!(retained, vec![item(1, "a")]);
        assert_eq!(store.load_installed().unwrap(), vec![item(1, "a")]);
    }

    #[test]
    fn test_commit_with_no_successes_is_identity() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        let installed = vec![item(1, "a")];

        commit(&store, &installed, &[outcome(item(1, "a"), false)]).unwrap();
        assert_eq!(store.load_installed().unwrap(), installed);
    }
}
