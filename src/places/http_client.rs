//! HTTP places provider
//!
//! `reqwest` client for a places-style JSON API exposing
//! `places:searchNearby`, `places:searchText` and `places/{id}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Result, SearchError};
use crate::places::{LatLng, NearbyRequest, PlacesProvider, RawPlace, TextRequest};

const FIELD_MASK: &str = "places.displayName,places.formattedAddress,places.location,\
places.rating,places.userRatingCount,places.priceLevel,places.id,places.types";
const DETAILS_FIELD_MASK: &str =
    "id,displayName,formattedAddress,location,rating,userRatingCount,priceLevel,types";
const LANGUAGE_CODE: &str = "ja";

#[derive(Debug, Default, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    places: Option<Vec<RawPlace>>,
}

#[derive(Clone)]
pub struct HttpPlacesClient {
    base_url: Url,
    api_key: String,
    http: reqwest::Client,
}

impl HttpPlacesClient {
    /// `timeout` bounds each HTTP exchange at the transport level; the
    /// aggregator applies its own per-query deadline on top.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(SearchError::InvalidRequest(
                "PLACES_API_BASE_URL is empty".to_string(),
            ));
        }
        let base_url = Url::parse(trimmed)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                SearchError::InvalidRequest(format!("Invalid PLACES_API_BASE_URL: {trimmed}"))
            })?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            api_key: api_key.to_string(),
            http,
        })
    }

    /// Appends `segments` to the base URL, each percent-encoded as a single
    /// path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                SearchError::InvalidRequest("Base URL cannot take a path".to_string())
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, field_mask: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", field_mask)
    }

    async fn post_search(&self, endpoint: &str, body: Value) -> Result<Vec<RawPlace>> {
        let url = self.endpoint(&[endpoint])?;
        let resp = self
            .request(Method::POST, url, FIELD_MASK)
            .json(&body)
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        let parsed: PlacesResponse = resp.json().await?;
        let places = parsed.places.unwrap_or_default();
        debug!(endpoint, count = places.len(), "places response received");
        Ok(places)
    }
}

fn circle(center: LatLng, radius_m: u32) -> Value {
    json!({
        "circle": {
            "center": { "latitude": center.lat, "longitude": center.lng },
            "radius": radius_m,
        }
    })
}

async fn ensure_success(resp: Response) -> Result<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(SearchError::Api { status, body })
}

#[async_trait]
impl PlacesProvider for HttpPlacesClient {
    async fn search_nearby(&self, request: &NearbyRequest) -> Result<Vec<RawPlace>> {
        let mut body = json!({
            "includedTypes": request.included_types,
            "maxResultCount": request.max_results,
            "locationRestriction": circle(request.center, request.radius_m),
            "languageCode": LANGUAGE_CODE,
        });
        if let Some(keyword) = request.keyword.as_deref().filter(|k| !k.is_empty()) {
            body["keyword"] = json!(keyword);
        }
        self.post_search("places:searchNearby", body).await
    }

    async fn search_text(&self, request: &TextRequest) -> Result<Vec<RawPlace>> {
        let body = json!({
            "textQuery": request.query,
            "locationBias": circle(request.center, request.bias_radius_m),
            "languageCode": LANGUAGE_CODE,
            "maxResultCount": request.max_results,
        });
        self.post_search("places:searchText", body).await
    }

    async fn place_details(&self, place_id: &str) -> Result<Option<RawPlace>> {
        // Dot segments would be dropped from the path instead of encoded
        if matches!(place_id, "" | "." | "..") {
            return Ok(None);
        }
        let url = self.endpoint(&["places", place_id])?;
        let resp = self
            .request(Method::GET, url, DETAILS_FIELD_MASK)
            .query(&[("languageCode", LANGUAGE_CODE)])
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = ensure_success(resp).await?;
        Ok(Some(resp.json().await?))
    }
}
