//! Shared cache handle
//!
//! Wraps the [`CacheStore`] in `Arc<RwLock<>>` and mirrors every mutation to
//! durable storage in the background.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cache::storage::{
    KeyValueStorage, MemoryStorage, CACHE_DATA_KEY, CACHE_METRICS_KEY, CACHE_SETTINGS_KEY,
};
use crate::cache::{
    CacheEntry, CacheMetrics, CacheSettings, CacheStore, CleanupReport, SettingsUpdate,
};
use crate::error::Result;

// == Shared Cache ==
/// Cloneable handle to the process cache.
///
/// Built once by the composition root and passed to whoever needs it.
/// The in-memory store is the source of truth; storage failures are logged
/// and never surface from reads or writes.
#[derive(Clone)]
pub struct SharedCache {
    store: Arc<RwLock<CacheStore>>,
    storage: Arc<dyn KeyValueStorage>,
    /// Serializes snapshot writes so they land in order
    writer: Arc<Mutex<()>>,
}

impl SharedCache {
    // == Constructors ==
    pub fn new(store: CacheStore, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            storage,
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Empty cache backed by volatile storage.
    pub fn in_memory(settings: CacheSettings) -> Self {
        Self::new(CacheStore::new(settings), Arc::new(MemoryStorage::new()))
    }

    /// Restores settings, entries and metrics from `storage`.
    ///
    /// Persisted settings override `defaults` field by field. A missing or
    /// unreadable snapshot yields an empty cache.
    pub async fn load(storage: Arc<dyn KeyValueStorage>, defaults: CacheSettings) -> Self {
        let settings = match read_json::<SettingsUpdate>(storage.as_ref(), CACHE_SETTINGS_KEY).await
        {
            Some(saved) => defaults.merged(&saved),
            None => defaults,
        };

        let entries = read_json::<HashMap<String, CacheEntry>>(storage.as_ref(), CACHE_DATA_KEY)
            .await
            .unwrap_or_default();
        let metrics = read_json::<CacheMetrics>(storage.as_ref(), CACHE_METRICS_KEY).await;

        let store = CacheStore::restore(settings, entries, metrics);
        info!("Cache loaded: {} entries", store.len());

        Self::new(store, storage)
    }

    // == Get ==
    /// Returns the cached value decoded as `T`, or `None` on miss/expiry.
    ///
    /// A value that no longer decodes as `T` is reported as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.store.write().await.get(key)?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(key, error = %e, "Cached value has an unexpected shape");
                None
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key` and schedules a background snapshot write.
    ///
    /// Only fails when `value` cannot be represented as JSON.
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let data = serde_json::to_value(value)?;
        let swept = self.store.write().await.set(key.to_string(), data, ttl);
        if let Some(report) = swept {
            info!(
                "Cache sweep on write: {} expired, {} evicted, {} remaining",
                report.expired, report.evicted, report.remaining
            );
        }
        self.persist_in_background();
        Ok(())
    }

    // == Remove ==
    /// Returns whether the key was present.
    pub async fn remove(&self, key: &str) -> bool {
        let removed = self.store.write().await.remove(key);
        if removed {
            debug!(key, "Cache entry removed");
        }
        self.persist_in_background();
        removed
    }

    // == Clear ==
    /// Drops all entries, resets metrics and persists both.
    pub async fn clear(&self) {
        self.store.write().await.clear();
        if let Err(e) = self.flush().await {
            warn!("Error saving cleared cache: {}", e);
        }
    }

    // == Cleanup ==
    /// Runs a sweep and persists the result.
    pub async fn cleanup(&self) -> CleanupReport {
        let report = self.store.write().await.cleanup();
        self.persist_in_background();
        report
    }

    // == Inspection ==
    pub async fn metrics(&self) -> CacheMetrics {
        self.store.read().await.metrics()
    }

    pub async fn settings(&self) -> CacheSettings {
        self.store.read().await.settings().clone()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Applies a partial settings change and persists the merged settings.
    pub async fn update_settings(&self, update: &SettingsUpdate) -> CacheSettings {
        let settings = self.store.write().await.update_settings(update);
        match serde_json::to_string(&settings) {
            Ok(json) => {
                if let Err(e) = self.storage.set_item(CACHE_SETTINGS_KEY, &json).await {
                    warn!("Error saving cache settings: {}", e);
                }
            }
            Err(e) => warn!("Error encoding cache settings: {}", e),
        }
        settings
    }

    // == Flush ==
    /// Writes the entry snapshot and metrics now, waiting for completion.
    pub async fn flush(&self) -> Result<()> {
        write_snapshot(&self.store, self.storage.as_ref(), &self.writer).await?;
        let metrics = serde_json::to_string(&self.store.read().await.metrics())?;
        self.storage.set_item(CACHE_METRICS_KEY, &metrics).await
    }

    /// Fire-and-forget snapshot write; failures are only logged.
    fn persist_in_background(&self) {
        let store = Arc::clone(&self.store);
        let storage = Arc::clone(&self.storage);
        let writer = Arc::clone(&self.writer);

        tokio::spawn(async move {
            if let Err(e) = write_snapshot(&store, storage.as_ref(), &writer).await {
                warn!("Error saving cache to storage: {}", e);
            }
        });
    }
}

/// Serializes the current map (not the map at scheduling time), so the last
/// write always reflects the latest state.
async fn write_snapshot(
    store: &RwLock<CacheStore>,
    storage: &dyn KeyValueStorage,
    writer: &Mutex<()>,
) -> Result<()> {
    let _guard = writer.lock().await;
    let json = store.read().await.snapshot_json()?;
    storage.set_item(CACHE_DATA_KEY, &json).await
}

async fn read_json<T: DeserializeOwned>(storage: &dyn KeyValueStorage, key: &str) -> Option<T> {
    match storage.get_item(key).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(key, error = %e, "Ignoring corrupted persisted cache data");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(key, error = %e, "Error loading cache data from storage");
            None
        }
    }
}
