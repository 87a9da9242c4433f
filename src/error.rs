//! Error types for the search service
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Search Error Enum ==
/// Unified error type for the cache, the places provider and the API.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A single provider query exceeded its time budget
    #[error("Query timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Places API answered with a non-success status
    #[error("Places API HTTP error: {status} - {body}")]
    Api { status: u16, body: String },

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding or decoding failure
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Durable storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let status = match &self {
            SearchError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            SearchError::NotFound(_) => StatusCode::NOT_FOUND,
            SearchError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            SearchError::Api { .. } | SearchError::Http(_) => StatusCode::BAD_GATEWAY,
            SearchError::Json(_) | SearchError::Storage(_) | SearchError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the search service.
pub type Result<T> = std::result::Result<T, SearchError>;
