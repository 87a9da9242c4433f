//! Response DTOs for the search API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheMetrics, CacheSettings};
use crate::places::PlaceRecord;

/// Response body for `GET /places/nearby`
#[derive(Debug, Clone, Serialize)]
pub struct NearbyResponse {
    pub count: usize,
    pub places: Vec<PlaceRecord>,
}

impl NearbyResponse {
    pub fn new(places: Vec<PlaceRecord>) -> Self {
        Self {
            count: places.len(),
            places,
        }
    }
}

/// Payload of one `progress` event on the nearby stream.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    /// 1-based index of this batch
    pub phase_count: usize,
    pub count: usize,
    pub places: Vec<PlaceRecord>,
}

impl ProgressEvent {
    pub fn new(phase_count: usize, places: &[PlaceRecord]) -> Self {
        Self {
            phase_count,
            count: places.len(),
            places: places.to_vec(),
        }
    }
}

/// Response body for `DELETE /cache/entries/:key`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub key: String,
    /// Whether an entry existed under the key
    pub removed: bool,
}

/// Response body for operations that only report success.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for the stats endpoint (`GET /cache/stats`)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Estimated size of all entries in bytes
    pub total_size: u64,
    /// Last sweep in RFC 3339
    pub last_cleanup: String,
    /// Entries physically present, expired or not
    pub entries: usize,
    pub settings: CacheSettings,
}

impl StatsResponse {
    pub fn new(metrics: &CacheMetrics, entries: usize, settings: CacheSettings) -> Self {
        Self {
            hits: metrics.hits,
            misses: metrics.misses,
            hit_rate: metrics.hit_rate(),
            total_size: metrics.total_size,
            last_cleanup: format_millis(metrics.last_cleanup),
            entries,
            settings,
        }
    }
}

/// Response body for the health endpoint (`GET /health`)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Whether real provider queries are possible
    pub api_key_configured: bool,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(api_key_configured: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            api_key_configured,
        }
    }
}

fn format_millis(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
        .map(|t| t.to_rfc3339())
        .unwrap_or_default()
}
