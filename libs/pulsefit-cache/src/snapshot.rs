//! Snapshot capture/restore for optimistic mutations
//!
//! A snapshot records, per key, the exact entry present at capture time
//! (`None` for absent keys). Restoring puts every captured entry back
//! verbatim and removes keys that were absent, so a failed optimistic write
//! leaves no trace.

use tracing::debug;

use crate::{Entry, ViewCache};

/// Captured pre-mutation state for a fixed set of keys.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    entries: Vec<(String, Option<Entry>)>,
}

impl CacheSnapshot {
    /// Keys covered by this snapshot, in capture order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub(crate) fn capture(cache: &ViewCache, keys: &[String]) -> CacheSnapshot {
    let entries = keys
        .iter()
        .map(|key| (key.clone(), cache.entry(key)))
        .collect::<Vec<_>>();

    debug!(count = entries.len(), "Snapshot captured");
    CacheSnapshot { entries }
}

pub(crate) fn restore(cache: &ViewCache, snapshot: CacheSnapshot) {
    let count = snapshot.entries.len();
    for (key, entry) in snapshot.entries {
        match entry {
            Some(entry) => {
                cache.put_entry(&key, entry);
                cache.metrics().record_rollback(&key);
            }
            None => {
                // Nothing existed at capture time; drop whatever was
                // optimistically written there since.
                if cache.remove_entry(&key) {
                    cache.metrics().record_rollback(&key);
                }
            }
        }
    }
    debug!(count = count, "Snapshot restored");
}
