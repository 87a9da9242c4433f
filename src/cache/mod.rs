//! Cache Module
//!
//! Persistent key-value cache with TTL expiration and size-bounded,
//! oldest-first eviction.

mod entry;
mod keys;
mod metrics;
mod settings;
mod shared;
mod storage;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use keys::{compose_key, place_details_key, search_key, PLACE_DETAILS_PREFIX, SEARCH_PREFIX};
pub use metrics::CacheMetrics;
pub use settings::{CacheSettings, SettingsUpdate};
pub use shared::SharedCache;
pub use storage::{
    FileStorage, KeyValueStorage, MemoryStorage, CACHE_DATA_KEY, CACHE_METRICS_KEY,
    CACHE_SETTINGS_KEY,
};
pub use store::{CacheStore, CleanupReport};
