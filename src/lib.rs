//! Sento Search - nearby bathhouse search service
//!
//! Finds sento, onsen and sauna facilities around a coordinate by merging
//! several places-API queries, filtering them with domain heuristics, and
//! caching the results with TTL expiry and size-bounded eviction.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod places;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{Result, SearchError};
pub use tasks::spawn_cleanup_task;
