// src/store.rs
//
// Last-good snapshot per data source. A store holds exactly one value and
// replaces it wholesale; readers either see the previous snapshot or the
// new one, never a blend. Failed polls never reach a store, so displayed
// data goes stale rather than blank.

use tracing::debug;

/// Holds the most recently accepted snapshot for one data source.
///
/// Polling is fire-and-forget, so responses can arrive out of issue order.
/// Every request carries a monotonic issue sequence number and `apply`
/// accepts a response only if its number is >= the last accepted one:
/// last-writer-wins by *issue time*, not by arrival time.
#[derive(Debug)]
pub struct SnapshotStore<T> {
    current: T,
    last_seq: Option<u64>,
}

impl<T: Default> SnapshotStore<T> {
    /// Starts with the type's placeholder value, which `current()` serves
    /// until the first successful poll.
    pub fn new() -> Self {
        Self {
            current: T::default(),
            last_seq: None,
        }
    }
}

impl<T> SnapshotStore<T> {
    pub fn current(&self) -> &T {
        &self.current
    }

    /// Replace the snapshot if `seq` is not stale. Returns whether the
    /// snapshot was accepted; a rejected snapshot leaves the store
    /// untouched.
    pub fn apply(&mut self, seq: u64, snapshot: T) -> bool {
        if let Some(last) = self.last_seq {
            if seq < last {
                debug!("rejecting stale snapshot (seq {} < last accepted {})", seq, last);
                return false;
            }
        }
        self.last_seq = Some(seq);
        self.current = snapshot;
        true
    }

    pub fn last_seq(&self) -> Option<u64> {
        self.last_seq
    }
}

impl<T: Default> Default for SnapshotStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnalyticsSnapshot;

    #[test]
    fn test_starts_with_placeholder() {
        let store: SnapshotStore<Vec<u32>> = SnapshotStore::new();
        assert!(store.current().is_empty());
        assert_eq!(store.last_seq(), None);
    }

    #[test]
    fn test_apply_replaces_wholesale() {
        let mut store = SnapshotStore::new();
        assert!(store.apply(1, vec![1, 2, 3]));
        assert!(store.apply(2, vec![9]));
        assert_eq!(store.current(), &vec![9]);
    }

    #[test]
    fn test_stale_sequence_rejected() {
        // Regression test pinning the out-of-order policy: if poll N+1's
        // response lands before poll N's, the straggler must not win.
        let mut store = SnapshotStore::new();
        assert!(store.apply(2, vec![20]));
        assert!(!store.apply(1, vec![10]));
        assert_eq!(store.current(), &vec![20]);
        assert_eq!(store.last_seq(), Some(2));
    }

    #[test]
    fn test_equal_sequence_accepted() {
        let mut store = SnapshotStore::new();
        assert!(store.apply(5, vec![1]));
        assert!(store.apply(5, vec![2]));
        assert_eq!(store.current(), &vec![2]);
    }

    #[test]
    fn test_failed_cycle_leaves_store_unchanged() {
        // A failed fetch never calls apply; the reader-visible snapshot is
        // byte-for-byte the pre-call value.
        let mut store: SnapshotStore<AnalyticsSnapshot> = SnapshotStore::new();
        let snapshot = AnalyticsSnapshot::default();
        store.apply(1, snapshot.clone());
        let before = store.current().clone();
        // (no apply happens for the failed cycle)
        assert_eq!(store.current(), &before);
    }
}
