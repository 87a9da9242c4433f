//! API Module
//!
//! HTTP handlers and routing for the search service REST API.
//!
//! # Endpoints
//! - `GET /places/nearby` - Bathhouses around a coordinate
//! - `GET /places/nearby/stream` - Progressive batches as server-sent events
//! - `GET /places/:place_id` - Facility details
//! - `/cache/*` - Cache statistics and administration
//! - `GET /diagnostics/api-key` - API key check
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
