//! Facility search façade
//!
//! Entry point for UI clients: credential check, cache lookup, aggregated
//! search, cache write and mock fallback.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{place_details_key, search_key, SharedCache};
use crate::places::{
    mock_places, Classifier, LatLng, PlaceRecord, PlacesProvider, ProgressFn, QueryPlan,
    SearchAggregator,
};

pub const PLACEHOLDER_API_KEY: &str = "your_actual_api_key_here";
const MIN_API_KEY_LEN: usize = 30;

/// Radius used in the cache key for mock results
pub const MOCK_RADIUS_M: u32 = 5_000;
/// Lifetime of cached search and details results
pub const RESULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

// == Credential Check ==
/// Outcome of checking the configured API key. Never carries the raw key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiKeyValidation {
    pub is_valid: bool,
    /// `first8...last4`, or `NONE` when no key is configured
    pub preview: String,
    pub issues: Vec<String>,
}

pub fn validate_api_key(key: &str) -> ApiKeyValidation {
    let mut issues = Vec::new();
    if key.is_empty() {
        issues.push("API key is empty or undefined".to_string());
    } else if key == PLACEHOLDER_API_KEY {
        issues.push("API key is still the placeholder value".to_string());
    } else if key.chars().count() < MIN_API_KEY_LEN {
        issues.push("API key is too short".to_string());
    }

    ApiKeyValidation {
        is_valid: issues.is_empty(),
        preview: mask_key(key),
        issues,
    }
}

fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return "NONE".to_string();
    }
    let chars: Vec<char> = key.chars().collect();
    let head: String = chars.iter().take(8).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{head}...{tail}")
}

// == Service ==
pub struct PlacesService {
    cache: SharedCache,
    provider: Arc<dyn PlacesProvider>,
    aggregator: SearchAggregator,
    api_key: String,
}

impl PlacesService {
    pub fn new(
        cache: SharedCache,
        provider: Arc<dyn PlacesProvider>,
        classifier: Classifier,
        plan: QueryPlan,
        api_key: impl Into<String>,
    ) -> Self {
        let aggregator = SearchAggregator::new(Arc::clone(&provider), Arc::new(classifier), plan);
        Self {
            cache,
            provider,
            aggregator,
            api_key: api_key.into(),
        }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    pub fn validate_api_key(&self) -> ApiKeyValidation {
        validate_api_key(&self.api_key)
    }

    /// Finds bathhouse-related facilities around `location`.
    ///
    /// Cache hits return immediately without reporting progress. Fresh
    /// results are cached for [`RESULT_TTL`]. Mock data is returned when the
    /// API key is unusable or when every provider query failed.
    pub async fn search_nearby(
        &self,
        location: LatLng,
        radius_m: u32,
        keyword: Option<&str>,
        mut on_progress: Option<ProgressFn<'_>>,
    ) -> Vec<PlaceRecord> {
        let validation = self.validate_api_key();
        if !validation.is_valid {
            warn!(
                "Places API key unusable ({}), preview {}; serving mock data",
                validation.issues.join(", "),
                validation.preview
            );
            return self.mock_results(location).await;
        }

        let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());
        let key = search_key(location.lat, location.lng, radius_m, keyword);
        if let Some(cached) = self.cache.get::<Vec<PlaceRecord>>(&key).await {
            debug!(key = %key, count = cached.len(), "Search served from cache");
            return cached;
        }

        info!(
            "Searching around ({}, {}) within {}m",
            location.lat, location.lng, radius_m
        );
        let reborrowed: Option<ProgressFn<'_>> = match on_progress {
            Some(ref mut callback) => Some(&mut **callback),
            None => None,
        };
        let outcome = self
            .aggregator
            .aggregate(location, radius_m, keyword, reborrowed)
            .await;

        if outcome.all_failed() {
            warn!("All {} provider queries failed; serving mock data", outcome.failed);
            let places = mock_places(location);
            if let Some(callback) = on_progress {
                callback(places.as_slice());
            }
            return places;
        }

        if let Err(e) = self.cache.set(&key, &outcome.places, Some(RESULT_TTL)).await {
            warn!("Error caching search results: {}", e);
        }
        outcome.places
    }

    /// Looks up one facility. Unknown ids, provider errors and an unusable
    /// key all yield `None`.
    pub async fn place_details(&self, place_id: &str) -> Option<PlaceRecord> {
        if !self.validate_api_key().is_valid {
            return None;
        }

        let key = place_details_key(place_id);
        if let Some(cached) = self.cache.get::<PlaceRecord>(&key).await {
            return Some(cached);
        }

        let raw = match self.provider.place_details(place_id).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Place details lookup for {} failed: {}", place_id, e);
                return None;
            }
        };

        let place = PlaceRecord::from_raw(raw)?;
        if let Err(e) = self.cache.set(&key, &place, Some(RESULT_TTL)).await {
            warn!("Error caching place details: {}", e);
        }
        Some(place)
    }

    async fn mock_results(&self, location: LatLng) -> Vec<PlaceRecord> {
        let key = search_key(location.lat, location.lng, MOCK_RADIUS_M, None);
        if let Some(cached) = self.cache.get::<Vec<PlaceRecord>>(&key).await {
            return cached;
        }

        let places = mock_places(location);
        if let Err(e) = self.cache.set(&key, &places, Some(RESULT_TTL)).await {
            warn!("Error caching mock results: {}", e);
        }
        places
    }
}
