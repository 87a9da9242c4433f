//! Sento Search - nearby bathhouse search service
//!
//! Serves progressive bathhouse search and cache administration over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sento_search::api::{create_router, AppState};
use sento_search::cache::{FileStorage, KeyValueStorage, MemoryStorage, SharedCache};
use sento_search::places::{Classifier, ClassifierRules, HttpPlacesClient, PlacesService};
use sento_search::{spawn_cleanup_task, Config};

/// Main entry point for the search server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Restore the cache from its snapshot directory
/// 4. Build the places client, classifier and search service
/// 5. Start background cache cleanup task
/// 6. Start HTTP server on configured port
/// 7. On SIGINT/SIGTERM, stop serving and flush the cache
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sento_search=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Sento Search Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, cache_dir={:?}, max_size={}MB, query_timeout={}ms",
        config.server_port, config.cache_dir, config.cache_max_size_mb, config.query_timeout_ms
    );

    let storage: Arc<dyn KeyValueStorage> = match &config.cache_dir {
        Some(dir) => Arc::new(
            FileStorage::open(dir.clone())
                .await
                .with_context(|| format!("failed to open cache directory {}", dir.display()))?,
        ),
        None => {
            warn!("CACHE_DIR is empty; cache will not survive restarts");
            Arc::new(MemoryStorage::new())
        }
    };
    let cache = SharedCache::load(storage, config.cache_settings()).await;

    let classifier = match &config.classifier_rules_path {
        Some(path) => {
            let rules = ClassifierRules::from_json_file(path)
                .with_context(|| format!("failed to load classifier rules {}", path.display()))?;
            info!("Classifier rules loaded from {}", path.display());
            Classifier::new(rules)
        }
        None => Classifier::default(),
    };

    let provider = HttpPlacesClient::new(
        &config.places_api_base_url,
        &config.places_api_key,
        Duration::from_millis(config.query_timeout_ms),
    )
    .context("failed to build places client")?;

    let service = PlacesService::new(
        cache.clone(),
        Arc::new(provider),
        classifier,
        config.query_plan(),
        config.places_api_key.clone(),
    );
    let validation = service.validate_api_key();
    if validation.is_valid {
        info!("Places API key configured ({})", validation.preview);
    } else {
        warn!(
            "Places API key unusable ({}); searches will return mock data",
            validation.issues.join(", ")
        );
    }

    let cleanup_interval = cache.settings().await.cleanup_interval();
    let cleanup_handle = spawn_cleanup_task(cache.clone(), cleanup_interval);
    info!("Background cleanup task started");

    let app = create_router(AppState::new(service, config.default_radius_m));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    if let Err(e) = cache.flush().await {
        warn!("Final cache flush failed: {}", e);
    }
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then aborts the cleanup task.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}
