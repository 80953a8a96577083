//! Generic optimistic-write transaction
//!
//! Capture a snapshot of every key a mutation may touch, patch the cache,
//! then settle: `commit` marks the keys stale so the next read triggers a
//! refetch from the source of truth, `rollback` restores the snapshot
//! verbatim. Either way the transaction is consumed; a settled write cannot
//! be reused.

use pulsefit_cache::{CacheOperations, CacheSnapshot, ViewCache};
use tracing::{debug, warn};

/// An in-flight optimistic mutation over a fixed key set.
#[must_use = "an optimistic write must be committed or rolled back"]
pub struct OptimisticWrite<'a> {
    cache: &'a ViewCache,
    snapshot: CacheSnapshot,
}

impl<'a> OptimisticWrite<'a> {
    /// Snapshot `keys` before any patch is applied.
    ///
    /// Keys with no current entry snapshot as absent; rolling back removes
    /// anything written under them in the meantime.
    pub fn begin(cache: &'a ViewCache, keys: &[String]) -> Self {
        let snapshot = cache.snapshot(keys);
        debug!(keys = snapshot.len(), "Optimistic write begun");
        Self { cache, snapshot }
    }

    /// Keys covered by this write, in begin order.
    pub fn keys(&self) -> Vec<String> {
        self.snapshot.keys().map(str::to_string).collect()
    }

    /// The remote mutation succeeded: mark every covered key stale so the
    /// server's view of the affected users is refetched.
    ///
    /// Returns the number of entries actually marked.
    pub fn commit(self) -> usize {
        let keys = self.keys();
        let marked = self.cache.mark_stale_many(&keys);
        debug!(keys = keys.len(), marked = marked, "Optimistic write committed");
        marked
    }

    /// The remote mutation failed: restore the snapshot verbatim, discarding
    /// every optimistic patch under the covered keys.
    pub fn rollback(self) {
        warn!(keys = self.snapshot.len(), "Optimistic write rolled back");
        self.cache.restore(self.snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsefit_cache::ttl;

    #[test]
    fn test_commit_marks_covered_keys_stale() {
        let cache = ViewCache::new();
        cache.set("v1:user:a", &"old", ttl::USER).unwrap();

        let keys = vec!["v1:user:a".to_string()];
        let tx = OptimisticWrite::begin(&cache, &keys);
        cache.set("v1:user:a", &"patched", ttl::USER).unwrap();

        assert_eq!(tx.commit(), 1);
        assert!(cache.is_stale("v1:user:a"));
        // The optimistic value stays visible until the refetch lands
        let got: Option<String> = cache.get("v1:user:a").unwrap();
        assert_eq!(got.as_deref(), Some("patched"));
    }

    #[test]
    fn test_rollback_restores_snapshot() {
        let cache = ViewCache::new();
        cache.set("v1:user:a", &"old", ttl::USER).unwrap();
        let before = cache.entry("v1:user:a").unwrap();

        let keys = vec!["v1:user:a".to_string(), "v1:user:b".to_string()];
        let tx = OptimisticWrite::begin(&cache, &keys);
        cache.set("v1:user:a", &"patched", ttl::USER).unwrap();
        cache.set("v1:user:b", &"phantom", ttl::USER).unwrap();

        tx.rollback();

        assert_eq!(cache.entry("v1:user:a").unwrap(), before);
        // Absent at begin-time, so rollback removes it entirely
        assert!(!cache.exists("v1:user:b"));
    }

    #[test]
    fn test_commit_counts_only_existing_entries() {
        let cache = ViewCache::new();
        cache.set("v1:user:a", &1, ttl::USER).unwrap();

        let keys = vec!["v1:user:a".to_string(), "v1:user:missing".to_string()];
        let tx = OptimisticWrite::begin(&cache, &keys);

        assert_eq!(tx.commit(), 1);
    }
}
