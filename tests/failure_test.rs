//! Integration tests for store failures, timeouts, and two-phase creates.

mod helpers;

use std::time::Duration;

use http::StatusCode;
use serde_json::json;

use letras_core::config::{AppConfig, CreateStrategy};
use letras_core::traits::DocumentStore;
use letras_database::StoreOp;

fn two_phase_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.create_strategy = CreateStrategy::TwoPhase;
    config.database.backfill.initial_backoff_ms = 1;
    config.database.backfill.max_backoff_ms = 2;
    config
}

#[tokio::test]
async fn test_store_failure_is_500() {
    let app = helpers::TestApp::new();
    app.store.fail_next(StoreOp::Count, 1);

    let response = app.request("GET", "/api/books", None).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "DATABASE");

    let retry = app.request("GET", "/api/books", None).await;
    assert_eq!(retry.status, StatusCode::OK);
}

#[tokio::test]
async fn test_lookup_failure_is_not_reported_as_absent() {
    let app = helpers::TestApp::new();
    app.store.fail_next(StoreOp::GetOne, 1);

    let response = app.request("GET", "/api/books/b1", None).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_slow_store_is_504() {
    let mut config = AppConfig::default();
    config.database.operation_timeout_ms = 50;
    let app = helpers::TestApp::with_config(config);
    app.store.set_latency(Duration::from_millis(500));

    let response = app.request("GET", "/api/movies", None).await;
    assert_eq!(response.status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(response.body["error"], "TIMEOUT");
}

#[tokio::test(start_paused = true)]
async fn test_slow_request_hits_request_timeout() {
    let mut config = AppConfig::default();
    config.database.operation_timeout_ms = 0;
    config.server.request_timeout_seconds = 1;
    let app = helpers::TestApp::with_config(config);
    app.store.set_latency(Duration::from_secs(5));

    let response = app.request("GET", "/api/movies", None).await;
    assert_eq!(response.status, StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn test_two_phase_create_writes_id_back() {
    let app = helpers::TestApp::with_config(two_phase_config());
    app.store.fail_next(StoreOp::Patch, 1);

    let id = app
        .create("books", json!({ "title": "Aura", "author": "Fuentes" }))
        .await;

    let stored = app.store.get_many("books").await.expect("scan");
    assert_eq!(stored.len(), 1);
    assert!(stored[0].has_id_field());
    assert_eq!(stored[0].id.as_str(), id);
}

#[tokio::test]
async fn test_two_phase_backfill_failure_is_partial_write() {
    let app = helpers::TestApp::with_config(two_phase_config());
    app.store.fail_always(StoreOp::Patch);

    let response = app
        .request(
            "POST",
            "/api/books",
            Some(json!({ "title": "Aura", "author": "Fuentes" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "PARTIAL_WRITE");

    let stored = app.store.get_many("books").await.expect("scan");
    assert_eq!(stored.len(), 1);
    assert!(!stored[0].has_id_field());

    app.store.clear_failures();
    let listing = app.request("GET", "/api/books", None).await;
    assert_eq!(listing.body["books"][0]["id"], stored[0].id.as_str());
}

#[tokio::test]
async fn test_health_reports_store_down() {
    let app = helpers::TestApp::new();
    app.store.fail_always(StoreOp::HealthCheck);

    let response = app.request("GET", "/api/health", None).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["store"], "down");
}
