//! Configuration Module
//!
//! Loads server, provider and cache configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::CacheSettings;
use crate::places::QueryPlan;

pub const DEFAULT_BASE_URL: &str = "https://places.googleapis.com/v1";
pub const DEFAULT_CACHE_DIR: &str = ".sento_cache";

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Places API key; an unusable key switches searches to mock data
    pub places_api_key: String,
    pub places_api_base_url: String,
    /// Snapshot directory; `None` keeps the cache in memory only
    pub cache_dir: Option<PathBuf>,
    pub cache_max_size_mb: f64,
    pub cache_default_ttl_secs: u64,
    pub cache_cleanup_interval_secs: u64,
    pub cache_auto_cleanup: bool,
    /// Deadline for each provider query
    pub query_timeout_ms: u64,
    /// Radius used when a request does not give one
    pub default_radius_m: u32,
    /// Optional JSON file overriding the classifier keyword tables
    pub classifier_rules_path: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `PLACES_API_KEY` - Places API key (default: empty)
    /// - `PLACES_API_BASE_URL` - Places API root (default: `https://places.googleapis.com/v1`)
    /// - `CACHE_DIR` - Snapshot directory, empty for memory only (default: `.sento_cache`)
    /// - `CACHE_MAX_SIZE_MB` - Size ceiling in MB (default: 100)
    /// - `CACHE_DEFAULT_TTL_SECS` - Default TTL in seconds (default: 604800)
    /// - `CACHE_CLEANUP_INTERVAL_SECS` - Sweep frequency in seconds (default: 86400)
    /// - `CACHE_AUTO_CLEANUP` - Sweep on write and in the background (default: true)
    /// - `QUERY_TIMEOUT_MS` - Per-query deadline (default: 5000)
    /// - `DEFAULT_RADIUS_M` - Default search radius (default: 10000)
    /// - `CLASSIFIER_RULES_PATH` - Classifier rules JSON (default: built-in tables)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable source. Unparseable values
    /// fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |name: &str| lookup(name).map(|v| v.trim().to_string());

        Self {
            server_port: parse_or(parsed("SERVER_PORT"), defaults.server_port),
            places_api_key: parsed("PLACES_API_KEY").unwrap_or(defaults.places_api_key),
            places_api_base_url: parsed("PLACES_API_BASE_URL")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.places_api_base_url),
            cache_dir: match parsed("CACHE_DIR") {
                Some(dir) if dir.is_empty() => None,
                Some(dir) => Some(PathBuf::from(dir)),
                None => defaults.cache_dir,
            },
            cache_max_size_mb: parse_or(parsed("CACHE_MAX_SIZE_MB"), defaults.cache_max_size_mb),
            cache_default_ttl_secs: parse_or(
                parsed("CACHE_DEFAULT_TTL_SECS"),
                defaults.cache_default_ttl_secs,
            ),
            cache_cleanup_interval_secs: parse_or(
                parsed("CACHE_CLEANUP_INTERVAL_SECS"),
                defaults.cache_cleanup_interval_secs,
            ),
            cache_auto_cleanup: parse_or(parsed("CACHE_AUTO_CLEANUP"), defaults.cache_auto_cleanup),
            query_timeout_ms: parse_or(parsed("QUERY_TIMEOUT_MS"), defaults.query_timeout_ms),
            default_radius_m: parse_or(parsed("DEFAULT_RADIUS_M"), defaults.default_radius_m),
            classifier_rules_path: parsed("CLASSIFIER_RULES_PATH")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Cache settings used when no persisted settings exist.
    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            max_size: self.cache_max_size_mb,
            default_ttl: self.cache_default_ttl_secs.saturating_mul(1000),
            cleanup_interval: self.cache_cleanup_interval_secs.saturating_mul(1000),
            auto_cleanup: self.cache_auto_cleanup,
        }
    }

    pub fn query_plan(&self) -> QueryPlan {
        QueryPlan {
            query_timeout_ms: self.query_timeout_ms,
            ..QueryPlan::default()
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            places_api_key: String::new(),
            places_api_base_url: DEFAULT_BASE_URL.to_string(),
            cache_dir: Some(PathBuf::from(DEFAULT_CACHE_DIR)),
            cache_max_size_mb: 100.0,
            cache_default_ttl_secs: 7 * 24 * 60 * 60,
            cache_cleanup_interval_secs: 24 * 60 * 60,
            cache_auto_cleanup: true,
            query_timeout_ms: 5000,
            default_radius_m: 10_000,
            classifier_rules_path: None,
        }
    }
}
