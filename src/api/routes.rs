//! API Routes
//!
//! Configures the Axum router with all search and cache endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    api_key_handler, cleanup_handler, clear_handler, delete_key_handler, health_handler,
    nearby_handler, nearby_stream_handler, place_details_handler, stats_handler,
    update_settings_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /places/nearby` - Search around a coordinate
/// - `GET /places/nearby/stream` - Same search as server-sent events
/// - `GET /places/:place_id` - Facility details
/// - `GET /cache/stats` - Cache metrics and settings
/// - `PUT /cache/settings` - Partial settings update
/// - `POST /cache/cleanup` - Run a sweep now
/// - `DELETE /cache` - Drop every entry
/// - `DELETE /cache/entries/:key` - Drop one entry
/// - `GET /diagnostics/api-key` - Masked API key check
///
/// # Middleware
/// - CORS: Allows any origin (the server is meant for local UI clients)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/places/nearby", get(nearby_handler))
        .route("/places/nearby/stream", get(nearby_stream_handler))
        .route("/places/:place_id", get(place_details_handler))
        .route("/cache", delete(clear_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache/settings", put(update_settings_handler))
        .route("/cache/cleanup", post(cleanup_handler))
        .route("/cache/entries/:key", delete(delete_key_handler))
        .route("/diagnostics/api-key", get(api_key_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
