//! Places-search capability
//!
//! The external collaborator the aggregator queries. Implementations return
//! raw provider records; normalization and classification happen in the
//! aggregator.

use async_trait::async_trait;

use crate::error::Result;
use crate::places::{LatLng, RawPlace};

/// Nearby-by-category query restricted to a circle.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyRequest {
    pub center: LatLng,
    pub radius_m: u32,
    pub included_types: Vec<String>,
    pub keyword: Option<String>,
    pub max_results: u32,
}

/// Free-text query biased toward a circle.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub query: String,
    pub center: LatLng,
    pub bias_radius_m: u32,
    pub max_results: u32,
}

#[async_trait]
pub trait PlacesProvider: Send + Sync {
    async fn search_nearby(&self, request: &NearbyRequest) -> Result<Vec<RawPlace>>;

    async fn search_text(&self, request: &TextRequest) -> Result<Vec<RawPlace>>;

    /// Returns `Ok(None)` when the provider does not know the id.
    async fn place_details(&self, place_id: &str) -> Result<Option<RawPlace>>;
}
