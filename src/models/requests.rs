//! Request DTOs for the search API
//!
//! Defines the structure of incoming query strings and bodies.

use serde::Deserialize;

use crate::places::LatLng;

/// Query string for `GET /places/nearby` and its streaming variant.
///
/// # Fields
/// - `lat`, `lng`: search center
/// - `radius`: search radius in metres (server default if not specified)
/// - `keyword`: optional extra search term
#[derive(Debug, Clone, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub radius: Option<u32>,
    #[serde(default)]
    pub keyword: Option<String>,
}

impl NearbyQuery {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if let Some(error) = self.location().range_error() {
            return Some(error.to_string());
        }
        if self.radius == Some(0) {
            return Some("radius must be greater than 0".to_string());
        }
        None
    }

    pub fn location(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// Keyword with surrounding whitespace removed; blank keywords are absent.
    pub fn keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}
