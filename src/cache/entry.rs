//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry with its JSON payload and timestamps.
///
/// Serialized as `{ "data", "createdAt", "expiresAt" }` in the persisted
/// snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// The stored value
    pub data: Value,
    /// Creation timestamp (Unix milliseconds)
    #[serde(alias = "timestamp")]
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), always after `created_at`
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry that expires `ttl` from now.
    ///
    /// A zero TTL is clamped to one millisecond so that `expires_at` stays
    /// strictly after `created_at`.
    pub fn new(data: Value, ttl: Duration) -> Self {
        Self::with_created_at(data, current_timestamp_ms(), ttl)
    }

    /// Creates an entry with an explicit creation time.
    pub fn with_created_at(data: Value, created_at: u64, ttl: Duration) -> Self {
        let ttl_ms = (ttl.as_millis() as u64).max(1);
        Self {
            data,
            created_at,
            expires_at: created_at.saturating_add(ttl_ms),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches `expires_at`.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Checks expiry against a caller-supplied clock reading.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }

    // == Size Estimate ==
    /// Approximates the in-memory footprint of the entry.
    ///
    /// Counts the UTF-16 code units of the JSON serialization, two bytes
    /// each. Only relative ordering matters for eviction.
    pub fn estimated_size(&self) -> u64 {
        match serde_json::to_string(self) {
            Ok(json) => json.encode_utf16().count() as u64 * 2,
            Err(_) => 0,
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(json!({"name": "桜湯"}), Duration::from_secs(60));

        assert_eq!(entry.data["name"], "桜湯");
        assert!(entry.expires_at > entry.created_at);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_zero_ttl_is_clamped() {
        let entry = CacheEntry::with_created_at(json!(1), 1_000, Duration::ZERO);
        assert_eq!(entry.expires_at, 1_001);
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(json!("v"), Duration::from_millis(1));

        sleep(Duration::from_millis(5));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::with_created_at(json!("v"), 100, Duration::from_millis(50));

        assert!(!entry.is_expired_at(149));
        assert!(entry.is_expired_at(150), "Entry should be expired at boundary");
    }

    #[test]
    fn test_serialized_shape_and_legacy_alias() {
        let entry = CacheEntry::with_created_at(json!([1, 2]), 10, Duration::from_millis(5));
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value, json!({"data": [1, 2], "createdAt": 10, "expiresAt": 15}));

        let legacy: CacheEntry =
            serde_json::from_str(r#"{"data": "x", "timestamp": 7, "expiresAt": 9}"#).unwrap();
        assert_eq!(legacy.created_at, 7);
    }

    #[test]
    fn test_estimated_size_counts_wide_characters() {
        let ascii = CacheEntry::with_created_at(json!("aaaa"), 1, Duration::from_millis(1));
        let wide = CacheEntry::with_created_at(json!("銭湯銭湯"), 1, Duration::from_millis(1));

        // Same number of characters, same UTF-16 length
        assert_eq!(ascii.estimated_size(), wide.estimated_size());
        assert!(ascii.estimated_size() > 0);
    }
}
