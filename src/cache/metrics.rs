//! Cache Metrics Module
//!
//! Tracks cache performance metrics: hits, misses, estimated size and the
//! time of the last sweep.

use serde::{Deserialize, Serialize};

use crate::cache::entry::current_timestamp_ms;

// == Cache Metrics ==
/// Process-wide cache counters, persisted best-effort as `cache_metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetrics {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Estimated size of all entries in bytes
    pub total_size: u64,
    /// Unix milliseconds of the last cleanup sweep
    pub last_cleanup: u64,
}

impl Default for CacheMetrics {
    fn default() -> Self {
        Self {
            hits: 0,
            misses: 0,
            total_size: 0,
            last_cleanup: current_timestamp_ms(),
        }
    }
}

impl CacheMetrics {
    // == Constructor ==
    /// Creates metrics with zeroed counters and `last_cleanup` set to now.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn set_total_size(&mut self, bytes: u64) {
        self.total_size = bytes;
    }

    pub fn mark_cleanup(&mut self, now_ms: u64) {
        self.last_cleanup = now_ms;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = CacheMetrics::new();
        assert_eq!(metrics.hits, 0);
        assert_eq!(metrics.misses, 0);
        assert_eq!(metrics.total_size, 0);
        assert!(metrics.last_cleanup > 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let metrics = CacheMetrics::new();
        assert_eq!(metrics.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut metrics = CacheMetrics::new();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_miss();
        assert_eq!(metrics.hit_rate(), 0.75);
    }

    #[test]
    fn test_metrics_json_shape() {
        let metrics = CacheMetrics {
            hits: 2,
            misses: 1,
            total_size: 640,
            last_cleanup: 99,
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["totalSize"], 640);
        assert_eq!(json["lastCleanup"], 99);
    }
}
