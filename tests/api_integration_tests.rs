//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint against a stub
//! places provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use sento_search::api::create_router;
use sento_search::cache::{search_key, CacheSettings, SharedCache};
use sento_search::places::{
    Classifier, DisplayName, NearbyRequest, PlacesProvider, PlacesService, QueryPlan, RawLocation,
    RawPlace, TextRequest,
};
use sento_search::{AppState, Result};
use serde_json::Value;
use tower::ServiceExt;

const API_KEY: &str = "AIzaSyA-integration-test-key-000000";

// == Helper Functions ==

/// Returns one facility per text query, named after the query.
#[derive(Default)]
struct EchoProvider {
    calls: AtomicUsize,
}

fn facility(id: &str, name: &str) -> RawPlace {
    RawPlace {
        id: Some(id.to_string()),
        display_name: Some(DisplayName::Plain(name.to_string())),
        formatted_address: Some("東京都墨田区, 日本".to_string()),
        location: Some(RawLocation {
            latitude: 35.71,
            longitude: 139.81,
        }),
        types: vec!["spa".to_string()],
        ..RawPlace::default()
    }
}

#[async_trait]
impl PlacesProvider for EchoProvider {
    async fn search_nearby(&self, _request: &NearbyRequest) -> Result<Vec<RawPlace>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            facility("nearby-1", "御谷湯"),
            facility("gym-1", "ゴールドジム 錦糸町"),
        ])
    }

    async fn search_text(&self, request: &TextRequest) -> Result<Vec<RawPlace>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![facility(
            &format!("text-{}", request.query),
            &format!("{}センター", request.query),
        )])
    }

    async fn place_details(&self, place_id: &str) -> Result<Option<RawPlace>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((place_id == "nearby-1").then(|| facility("nearby-1", "御谷湯")))
    }
}

struct TestApp {
    router: Router,
    provider: Arc<EchoProvider>,
    cache: SharedCache,
}

fn create_test_app(api_key: &str) -> TestApp {
    let provider = Arc::new(EchoProvider::default());
    let cache = SharedCache::in_memory(CacheSettings::default());
    let service = PlacesService::new(
        cache.clone(),
        provider.clone(),
        Classifier::default(),
        QueryPlan::default(),
        api_key,
    );
    TestApp {
        router: create_router(AppState::new(service, 10_000)),
        provider,
        cache,
    }
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// == Search Endpoint Tests ==

#[tokio::test]
async fn test_nearby_search_merges_and_filters() {
    let app = create_test_app(API_KEY);

    let uri = "/places/nearby?lat=35.71&lng=139.81";
    let (status, json) = send(&app.router, "GET", uri, None).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = json["places"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["placeId"].as_str().unwrap())
        .collect();
    // Gym rejected; every text query contributes one facility in plan order
    assert_eq!(
        ids,
        vec![
            "nearby-1",
            "text-銭湯",
            "text-温泉",
            "text-サウナ",
            "text-スパ",
            "text-湯",
            "text-風呂"
        ]
    );
    assert_eq!(json["count"], 7);
    assert_eq!(json["places"][0]["vicinity"], "東京都墨田区");
}

#[tokio::test]
async fn test_nearby_search_is_cached() {
    let app = create_test_app(API_KEY);
    let uri = "/places/nearby?lat=35.71&lng=139.81&radius=3000&keyword=%E6%98%A5%E3%81%AE%E6%B9%AF";

    let (_, first) = send(&app.router, "GET", uri, None).await;
    let calls = app.provider.calls.load(Ordering::SeqCst);
    let (_, second) = send(&app.router, "GET", uri, None).await;

    assert_eq!(first, second);
    assert_eq!(app.provider.calls.load(Ordering::SeqCst), calls);

    let (_, stats) = send(&app.router, "GET", "/cache/stats", None).await;
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 1);

    let key = search_key(35.71, 139.81, 3000, Some("春の湯"));
    assert!(app.cache.get::<Value>(&key).await.is_some());
}

#[tokio::test]
async fn test_nearby_search_without_key_uses_mock() {
    let app = create_test_app("your_actual_api_key_here");

    let (status, json) = send(&app.router, "GET", "/places/nearby?lat=35.0&lng=139.0", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 3);
    assert_eq!(app.provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_nearby_search_validation() {
    let app = create_test_app(API_KEY);

    let (status, json) = send(&app.router, "GET", "/places/nearby?lat=10&lng=500", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("lng"));

    let (status, _) = send(&app.router, "GET", "/places/nearby?lat=10&lng=10&radius=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_nearby_stream_emits_progress_then_complete() {
    let app = create_test_app(API_KEY);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/places/nearby/stream?lat=35.71&lng=139.81")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    let events: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("event:"))
        .map(str::trim)
        .collect();

    // nearby, three priority queries, one report for the concurrent batch
    assert_eq!(
        events,
        vec!["progress", "progress", "progress", "progress", "progress", "complete"]
    );
    assert!(text.contains("\"phase_count\":5"));
    assert!(text.contains("\"count\":7"));
}

// == Details Endpoint Tests ==

#[tokio::test]
async fn test_place_details_endpoint() {
    let app = create_test_app(API_KEY);

    let (status, json) = send(&app.router, "GET", "/places/nearby-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "御谷湯");

    let (status, json) = send(&app.router, "GET", "/places/unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json.get("error").is_some());
}

// == Cache Endpoint Tests ==

#[tokio::test]
async fn test_cache_settings_update() {
    let app = create_test_app(API_KEY);

    let (status, json) = send(
        &app.router,
        "PUT",
        "/cache/settings",
        Some(r#"{"maxSize": 0.5, "autoCleanup": false}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["maxSize"], 0.5);
    assert_eq!(json["autoCleanup"], false);
    assert_eq!(json["defaultTtl"], 604_800_000u64);
}

#[tokio::test]
async fn test_cache_settings_rejects_invalid() {
    let app = create_test_app(API_KEY);

    let (status, _) = send(&app.router, "PUT", "/cache/settings", Some(r#"{"maxSize": -1}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cache_delete_and_clear() {
    let app = create_test_app(API_KEY);
    app.cache.set("a", &1, None).await.unwrap();
    app.cache.set("b", &2, None).await.unwrap();

    let (status, json) = send(&app.router, "DELETE", "/cache/entries/a", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], true);

    let (_, json) = send(&app.router, "DELETE", "/cache/entries/a", None).await;
    assert_eq!(json["removed"], false);

    app.cache.set("stats", &3, None).await.unwrap();
    let (status, json) = send(&app.router, "DELETE", "/cache/entries/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], true);

    let (status, _) = send(&app.router, "DELETE", "/cache", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.cache.is_empty().await);

    let (_, stats) = send(&app.router, "GET", "/cache/stats", None).await;
    assert_eq!(stats["entries"], 0);
    assert_eq!(stats["hits"], 0);
}

#[tokio::test]
async fn test_cache_cleanup_endpoint() {
    let app = create_test_app(API_KEY);
    app.cache
        .set("short", &"x", Some(std::time::Duration::from_millis(1)))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let (status, json) = send(&app.router, "POST", "/cache/cleanup", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["expired"], 1);
    assert_eq!(json["remaining"], 0);
}

// == Diagnostics Endpoint Tests ==

#[tokio::test]
async fn test_api_key_diagnostics() {
    let app = create_test_app(API_KEY);

    let (status, json) = send(&app.router, "GET", "/diagnostics/api-key", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["is_valid"], true);
    assert_eq!(json["preview"], "AIzaSyA-...0000");
    assert!(!json.to_string().contains(API_KEY));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app("");

    let (status, json) = send(&app.router, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["api_key_configured"], false);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = create_test_app(API_KEY);

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
