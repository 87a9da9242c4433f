//! API Handlers
//!
//! HTTP request handlers for the search and cache administration endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{self, Stream};
use tokio::sync::mpsc;
use tracing::debug;

use crate::cache::{CacheSettings, CleanupReport, SettingsUpdate, SharedCache};
use crate::error::{Result, SearchError};
use crate::models::{
    DeleteResponse, HealthResponse, MessageResponse, NearbyQuery, NearbyResponse, ProgressEvent,
    StatsResponse,
};
use crate::places::{ApiKeyValidation, PlaceRecord, PlacesService};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PlacesService>,
    /// Radius used when a search request omits one
    pub default_radius: u32,
}

impl AppState {
    pub fn new(service: PlacesService, default_radius: u32) -> Self {
        Self {
            service: Arc::new(service),
            default_radius,
        }
    }

    pub fn cache(&self) -> &SharedCache {
        self.service.cache()
    }

    fn radius_for(&self, query: &NearbyQuery) -> u32 {
        query.radius.unwrap_or(self.default_radius)
    }
}

/// Handler for GET /places/nearby
///
/// Runs a full search and returns the final list.
pub async fn nearby_handler(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<NearbyResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(SearchError::InvalidRequest(error_msg));
    }

    let places = state
        .service
        .search_nearby(
            query.location(),
            state.radius_for(&query),
            query.keyword(),
            None,
        )
        .await;

    Ok(Json(NearbyResponse::new(places)))
}

enum StreamMessage {
    Progress(ProgressEvent),
    Complete(NearbyResponse),
}

impl StreamMessage {
    fn into_event(self) -> std::result::Result<Event, axum::Error> {
        match self {
            StreamMessage::Progress(progress) => {
                Event::default().event("progress").json_data(progress)
            }
            StreamMessage::Complete(done) => Event::default().event("complete").json_data(done),
        }
    }
}

/// Handler for GET /places/nearby/stream
///
/// Streams every growing batch as a `progress` event, then the final list
/// as one `complete` event. The search runs in its own task and still
/// fills the cache if the client disconnects.
pub async fn nearby_stream_handler(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>>> {
    if let Some(error_msg) = query.validate() {
        return Err(SearchError::InvalidRequest(error_msg));
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let service = Arc::clone(&state.service);
    let location = query.location();
    let radius = state.radius_for(&query);
    let keyword = query.keyword().map(str::to_string);

    tokio::spawn(async move {
        let progress_tx = tx.clone();
        let mut phase_count = 0;
        let mut on_progress = move |places: &[PlaceRecord]| {
            phase_count += 1;
            // A closed channel means the client left; keep searching anyway
            let _ = progress_tx.send(StreamMessage::Progress(ProgressEvent::new(
                phase_count,
                places,
            )));
        };

        let places = service
            .search_nearby(location, radius, keyword.as_deref(), Some(&mut on_progress))
            .await;
        if tx.send(StreamMessage::Complete(NearbyResponse::new(places))).is_err() {
            debug!("Stream client disconnected before completion");
        }
    });

    let events = stream::unfold(rx, |mut rx| async move {
        let message = rx.recv().await?;
        Some((message.into_event(), rx))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Handler for GET /places/:place_id
pub async fn place_details_handler(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> Result<Json<PlaceRecord>> {
    state
        .service
        .place_details(&place_id)
        .await
        .map(Json)
        .ok_or_else(|| SearchError::NotFound(format!("Place '{}' not found", place_id)))
}

/// Handler for GET /cache/stats
///
/// Returns current cache metrics and settings.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache();
    let metrics = cache.metrics().await;
    let entries = cache.len().await;
    let settings = cache.settings().await;

    Json(StatsResponse::new(&metrics, entries, settings))
}

/// Handler for PUT /cache/settings
///
/// Merges a partial settings change and returns the full settings.
pub async fn update_settings_handler(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<CacheSettings>> {
    if let Some(error_msg) = update.validate() {
        return Err(SearchError::InvalidRequest(error_msg));
    }

    Ok(Json(state.cache().update_settings(&update).await))
}

/// Handler for POST /cache/cleanup
pub async fn cleanup_handler(State(state): State<AppState>) -> Json<CleanupReport> {
    Json(state.cache().cleanup().await)
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.cache().clear().await;
    Json(MessageResponse::new("Cache cleared"))
}

/// Handler for DELETE /cache/entries/:key
///
/// Removal is unconditional; `removed` reports whether the key existed.
pub async fn delete_key_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    let removed = state.cache().remove(&key).await;
    Json(DeleteResponse { key, removed })
}

/// Handler for GET /diagnostics/api-key
pub async fn api_key_handler(State(state): State<AppState>) -> Json<ApiKeyValidation> {
    Json(state.service.validate_api_key())
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.service.validate_api_key().is_valid))
}
