//! Cache Settings Module
//!
//! Tunable limits for the cache store, persisted as `cache_settings`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Bytes per megabyte used when converting `max_size`.
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// == Cache Settings ==
/// Cache configuration.
///
/// Durations are stored as milliseconds so the persisted JSON stays a flat
/// `{ maxSize, defaultTtl, cleanupInterval, autoCleanup }` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheSettings {
    /// Eviction ceiling in megabytes (fractions allowed)
    pub max_size: f64,
    /// TTL in milliseconds used when the caller omits one
    pub default_ttl: u64,
    /// Minimum spacing between automatic sweeps, in milliseconds
    pub cleanup_interval: u64,
    /// Whether sweeps run automatically on write and on a timer
    pub auto_cleanup: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_size: 100.0,
            default_ttl: 7 * 24 * 60 * 60 * 1000,
            cleanup_interval: 24 * 60 * 60 * 1000,
            auto_cleanup: true,
        }
    }
}

impl CacheSettings {
    pub fn max_size_bytes(&self) -> u64 {
        (self.max_size.max(0.0) * BYTES_PER_MB) as u64
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval)
    }

    /// Returns a copy with every field present in `update` replaced.
    pub fn merged(&self, update: &SettingsUpdate) -> Self {
        Self {
            max_size: update.max_size.unwrap_or(self.max_size),
            default_ttl: update.default_ttl.unwrap_or(self.default_ttl),
            cleanup_interval: update.cleanup_interval.unwrap_or(self.cleanup_interval),
            auto_cleanup: update.auto_cleanup.unwrap_or(self.auto_cleanup),
        }
    }
}

// == Settings Update ==
/// Partial settings change; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default)]
    pub max_size: Option<f64>,
    #[serde(default)]
    pub default_ttl: Option<u64>,
    #[serde(default)]
    pub cleanup_interval: Option<u64>,
    #[serde(default)]
    pub auto_cleanup: Option<bool>,
}

impl SettingsUpdate {
    /// Rejects values the store cannot honour.
    pub fn validate(&self) -> Option<String> {
        if let Some(max_size) = self.max_size {
            if !max_size.is_finite() || max_size <= 0.0 {
                return Some("maxSize must be a positive number of megabytes".to_string());
            }
        }
        if self.default_ttl == Some(0) {
            return Some("defaultTtl must be greater than zero".to_string());
        }
        if self.cleanup_interval == Some(0) {
            return Some("cleanupInterval must be greater than zero".to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = CacheSettings::default();
        assert_eq!(settings.max_size_bytes(), 100 * 1024 * 1024);
        assert_eq!(settings.default_ttl(), Duration::from_secs(7 * 24 * 3600));
        assert_eq!(settings.cleanup_interval(), Duration::from_secs(24 * 3600));
        assert!(settings.auto_cleanup);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: CacheSettings = serde_json::from_str(r#"{"maxSize": 0.5}"#).unwrap();
        assert_eq!(settings.max_size, 0.5);
        assert_eq!(settings.max_size_bytes(), 512 * 1024);
        assert!(settings.auto_cleanup);
    }

    #[test]
    fn test_merge_update() {
        let update = SettingsUpdate {
            auto_cleanup: Some(false),
            default_ttl: Some(1_000),
            ..Default::default()
        };
        let merged = CacheSettings::default().merged(&update);

        assert!(!merged.auto_cleanup);
        assert_eq!(merged.default_ttl, 1_000);
        assert_eq!(merged.max_size, 100.0);
    }

    #[test]
    fn test_update_validation() {
        assert!(SettingsUpdate::default().validate().is_none());

        let bad = SettingsUpdate {
            max_size: Some(-1.0),
            ..Default::default()
        };
        assert!(bad.validate().is_some());

        let bad = SettingsUpdate {
            cleanup_interval: Some(0),
            ..Default::default()
        };
        assert!(bad.validate().is_some());
    }
}
