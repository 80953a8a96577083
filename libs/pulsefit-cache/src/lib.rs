//! PulseFit view-cache layer
//!
//! In-process key→entry store backing the client data layer, with:
//! - Unified key schema with versioning (plus REST-path key aliases)
//! - Negative caching (cache miss sentinel)
//! - Staleness marking for refetch-on-invalidate
//! - Snapshot/restore for optimistic mutations
//! - Metrics integration
//!
//! Values are stored as serialized JSON strings, so restoring a snapshot
//! restores the exact bytes that were captured.

mod error;
mod keys;
mod metrics;
mod snapshot;

pub mod registry;
pub mod user;

pub use error::{CacheError, CacheResult};
pub use keys::{CacheKey, CACHE_VERSION};
pub use metrics::CacheMetrics;
pub use snapshot::CacheSnapshot;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Cache miss sentinel value - used for negative caching
pub const CACHE_MISS_SENTINEL: &str = "__pulsefit_cache_miss__";

/// Default TTL values (seconds)
pub mod ttl {
    pub const USER: u64 = 3600; // 1 hour
    pub const USER_LIST: u64 = 300; // 5 minutes
    pub const NEGATIVE: u64 = 60; // 1 minute for cache miss
}

/// A single cached view: the raw serialized payload plus bookkeeping.
///
/// `stale` means the entry is awaiting a refetch but may still be served;
/// an expired entry is treated as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub data: String,
    pub stale: bool,
    pub cached_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }
}

/// Core cache operations trait
pub trait CacheOperations: Send + Sync {
    /// Get a value from cache (stale entries are still returned)
    fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>>;

    /// Set a value in cache with TTL
    fn set<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) -> CacheResult<()>;

    /// Delete a key from cache; returns whether it was present
    fn del(&self, key: &str) -> bool;

    /// Check if key exists (and is not expired)
    fn exists(&self, key: &str) -> bool;

    /// Mark an entry stale (refetch pending); returns whether it was present
    fn mark_stale(&self, key: &str) -> bool;

    /// Whether an existing entry is marked stale
    fn is_stale(&self, key: &str) -> bool;

    /// Set negative cache (cache miss marker)
    fn set_negative(&self, key: &str);

    /// Check if value is negative cache
    fn is_negative_cache(value: &str) -> bool
    where
        Self: Sized,
    {
        value == CACHE_MISS_SENTINEL
    }

    /// Batch stale-marking
    fn mark_stale_many(&self, keys: &[String]) -> usize;

    /// Batch delete
    fn del_many(&self, keys: &[String]) -> usize;
}

/// PulseFit view cache
#[derive(Clone, Default)]
pub struct ViewCache {
    entries: Arc<DashMap<String, Entry>>,
    metrics: CacheMetrics,
}

impl ViewCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            metrics: CacheMetrics::new(),
        }
    }

    /// Add jitter to TTL to prevent synchronized expiry
    fn add_jitter(ttl_secs: u64) -> u64 {
        let jitter_percent = (rand::random::<u32>() % 10) as f64 / 100.0;
        let jitter = (ttl_secs as f64 * jitter_percent).round() as u64;
        ttl_secs + jitter
    }

    /// Get raw string value (for checking negative cache)
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.entry(key).map(|e| e.data)
    }

    /// Get the full entry for a key, expiry-checked.
    ///
    /// Expired entries are removed lazily here.
    pub fn entry(&self, key: &str) -> Option<Entry> {
        let entry = self.entries.get(key).map(|e| e.clone())?;
        if entry.is_expired() {
            self.entries.remove(key);
            return None;
        }
        Some(entry)
    }

    /// Put a raw entry back verbatim (snapshot restore path)
    pub fn put_entry(&self, key: &str, entry: Entry) {
        self.entries.insert(key.to_string(), entry);
    }

    /// Remove a key without metrics side effects (snapshot restore path)
    pub(crate) fn remove_entry(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub(crate) fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Capture the current entries under `keys`, in order.
    ///
    /// Keys with no entry are captured as absent - there is nothing to roll
    /// back for them, but a restore removes anything written there since.
    pub fn snapshot(&self, keys: &[String]) -> CacheSnapshot {
        snapshot::capture(self, keys)
    }

    /// Restore a previously captured snapshot verbatim.
    pub fn restore(&self, snapshot: CacheSnapshot) {
        snapshot::restore(self, snapshot)
    }
}

impl CacheOperations for ViewCache {
    fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        match self.entry(key) {
            Some(entry) => {
                // Check for negative cache
                if entry.data == CACHE_MISS_SENTINEL {
                    debug!(key = %key, "Cache negative hit");
                    self.metrics.record_negative_hit(key);
                    return Ok(None);
                }

                match serde_json::from_str::<T>(&entry.data) {
                    Ok(value) => {
                        if entry.stale {
                            debug!(key = %key, "Cache stale hit");
                            self.metrics.record_stale_hit(key);
                        } else {
                            debug!(key = %key, "Cache hit");
                        }
                        self.metrics.record_hit(key);
                        Ok(Some(value))
                    }
                    Err(e) => {
                        warn!(key = %key, error = %e, "Cache deserialization failed");
                        self.metrics.record_error(key, "deserialize");
                        // Drop corrupted cache entry
                        self.entries.remove(key);
                        Ok(None)
                    }
                }
            }
            None => {
                debug!(key = %key, "Cache miss");
                self.metrics.record_miss(key);
                Ok(None)
            }
        }
    }

    fn set<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) -> CacheResult<()> {
        let data = serde_json::to_string(value).map_err(CacheError::Serialization)?;
        let ttl_with_jitter = Self::add_jitter(ttl_secs);

        let now = Utc::now();
        self.entries.insert(
            key.to_string(),
            Entry {
                data,
                stale: false,
                cached_at: now,
                expires_at: Some(now + Duration::seconds(ttl_with_jitter as i64)),
            },
        );

        debug!(key = %key, ttl = ttl_with_jitter, "Cache set");
        self.metrics.record_write(key);
        Ok(())
    }

    fn del(&self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            debug!(key = %key, "Cache delete");
            self.metrics.record_invalidation(key);
        }
        removed
    }

    fn exists(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    fn mark_stale(&self, key: &str) -> bool {
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                entry.stale = true;
                debug!(key = %key, "Cache marked stale");
                self.metrics.record_invalidation(key);
                true
            }
            None => false,
        }
    }

    fn is_stale(&self, key: &str) -> bool {
        self.entry(key).map(|e| e.stale).unwrap_or(false)
    }

    fn set_negative(&self, key: &str) {
        let now = Utc::now();
        self.entries.insert(
            key.to_string(),
            Entry {
                data: CACHE_MISS_SENTINEL.to_string(),
                stale: false,
                cached_at: now,
                expires_at: Some(now + Duration::seconds(ttl::NEGATIVE as i64)),
            },
        );

        debug!(key = %key, "Cache set negative");
        self.metrics.record_negative_write(key);
    }

    fn mark_stale_many(&self, keys: &[String]) -> usize {
        let mut marked = 0;
        for key in keys {
            if self.mark_stale(key) {
                marked += 1;
            }
        }
        debug!(count = marked, "Cache batch mark stale");
        marked
    }

    fn del_many(&self, keys: &[String]) -> usize {
        let mut removed = 0;
        for key in keys {
            if self.del(key) {
                removed += 1;
            }
        }
        debug!(count = removed, "Cache batch delete");
        removed
    }
}
