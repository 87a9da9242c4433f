//! Cache Store Module
//!
//! Main cache engine: HashMap storage with TTL expiration and oldest-first
//! eviction under a soft size ceiling.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheMetrics, CacheSettings, SettingsUpdate};

// == Cleanup Report ==
/// Outcome of a single sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Entries dropped because their TTL had passed
    pub expired: usize,
    /// Unexpired entries dropped to get under the size ceiling
    pub evicted: usize,
    /// Entries left after the sweep
    pub remaining: usize,
}

// == Cache Store ==
/// In-memory cache of JSON values with TTL expiry and size-bounded eviction.
///
/// This type is not synchronized; share it behind a lock (see
/// [`SharedCache`](crate::cache::SharedCache)).
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Performance metrics
    metrics: CacheMetrics,
    /// Limits and sweep policy
    settings: CacheSettings,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty CacheStore with the given settings.
    pub fn new(settings: CacheSettings) -> Self {
        Self {
            entries: HashMap::new(),
            metrics: CacheMetrics::new(),
            settings,
        }
    }

    /// Rebuilds a store from persisted parts, discarding expired entries.
    pub fn restore(
        settings: CacheSettings,
        entries: HashMap<String, CacheEntry>,
        metrics: Option<CacheMetrics>,
    ) -> Self {
        let now = current_timestamp_ms();
        let entries = entries
            .into_iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .collect();

        let mut store = Self {
            entries,
            metrics: metrics.unwrap_or_default(),
            settings,
        };
        store.refresh_size();
        store
    }

    // == Set ==
    /// Stores a value with an optional TTL, overwriting any existing entry.
    ///
    /// When `auto_cleanup` is enabled and the store is over its ceiling or
    /// the cleanup interval has elapsed, a sweep runs before returning and
    /// its report is handed back.
    pub fn set(
        &mut self,
        key: String,
        data: Value,
        ttl: Option<Duration>,
    ) -> Option<CleanupReport> {
        let ttl = ttl.unwrap_or_else(|| self.settings.default_ttl());
        let now = current_timestamp_ms();
        self.entries
            .insert(key, CacheEntry::with_created_at(data, now, ttl));
        self.refresh_size();

        if self.settings.auto_cleanup && self.should_cleanup(now) {
            Some(self.cleanup_at(now))
        } else {
            None
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Expired entries are removed on read and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = current_timestamp_ms();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                let data = entry.data.clone();
                self.metrics.record_hit();
                Some(data)
            }
            Some(_) => {
                self.entries.remove(key);
                self.refresh_size();
                self.metrics.record_miss();
                None
            }
            None => {
                self.metrics.record_miss();
                None
            }
        }
    }

    // == Remove ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.refresh_size();
        }
        removed
    }

    // == Clear ==
    /// Drops every entry and resets metrics.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.metrics = CacheMetrics::new();
    }

    // == Cleanup ==
    /// Removes expired entries, then evicts oldest entries by `created_at`
    /// until the estimated size fits under `max_size`.
    pub fn cleanup(&mut self) -> CleanupReport {
        self.cleanup_at(current_timestamp_ms())
    }

    fn cleanup_at(&mut self, now: u64) -> CleanupReport {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        let expired = before - self.entries.len();

        let ceiling = self.settings.max_size_bytes();
        let mut sized: Vec<(String, u64, u64)> = self
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.created_at, entry.estimated_size()))
            .collect();
        let mut total: u64 = sized.iter().map(|(_, _, size)| size).sum();

        let mut evicted = 0;
        if total > ceiling {
            sized.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
            for (key, _, size) in sized {
                if total <= ceiling {
                    break;
                }
                self.entries.remove(&key);
                total -= size;
                evicted += 1;
            }
        }

        self.metrics.mark_cleanup(now);
        self.metrics.set_total_size(total);

        debug!(expired, evicted, remaining = self.entries.len(), "cache sweep finished");

        CleanupReport {
            expired,
            evicted,
            remaining: self.entries.len(),
        }
    }

    /// True when the store is over its ceiling or a sweep is overdue.
    pub fn should_cleanup(&self, now: u64) -> bool {
        let size_exceeded = self.metrics.total_size > self.settings.max_size_bytes();
        let since_last = now.saturating_sub(self.metrics.last_cleanup);
        size_exceeded || since_last > self.settings.cleanup_interval
    }

    // == Settings ==
    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Applies a partial settings change and returns the result.
    pub fn update_settings(&mut self, update: &SettingsUpdate) -> CacheSettings {
        self.settings = self.settings.merged(update);
        self.settings.clone()
    }

    // == Metrics ==
    /// Returns a copy of the current metrics.
    pub fn metrics(&self) -> CacheMetrics {
        self.metrics.clone()
    }

    /// Estimated byte size of all entries.
    pub fn current_size(&self) -> u64 {
        self.entries.values().map(CacheEntry::estimated_size).sum()
    }

    fn refresh_size(&mut self) {
        let size = self.current_size();
        self.metrics.set_total_size(size);
    }

    // == Snapshot ==
    /// Serializes every entry as a JSON object keyed by cache key.
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.entries)
    }

    // == Length ==
    /// Returns the number of physically present entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn insert_entry(&mut self, key: &str, entry: CacheEntry) {
        self.entries.insert(key.to_string(), entry);
        self.refresh_size();
    }

    #[cfg(test)]
    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}
