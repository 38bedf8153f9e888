//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use letras_api::{AppState, build_app};
use letras_core::config::AppConfig;
use letras_core::traits::DocumentStore;
use letras_database::{MemoryDocumentStore, TimedStore};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// The in-memory store behind the router, for seeding and fault injection
    pub store: MemoryDocumentStore,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a test application with default configuration
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a test application with the given configuration
    pub fn with_config(config: AppConfig) -> Self {
        let store = MemoryDocumentStore::new();
        let shared: Arc<dyn DocumentStore> = Arc::new(store.clone());
        let shared: Arc<dyn DocumentStore> = match config.database.operation_timeout() {
            Some(timeout) => Arc::new(TimedStore::new(shared, timeout)),
            None => shared,
        };
        let router = build_app(AppState::new(config.clone(), shared));
        Self {
            router,
            store,
            config,
        }
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Create a record through the API and return its id
    pub async fn create(&self, collection: &str, body: Value) -> String {
        let response = self
            .request("POST", &format!("/api/{collection}"), Some(body))
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "create failed: {:?}",
            response.body
        );
        response.body["id"]
            .as_str()
            .expect("No id in create response")
            .to_string()
    }

    /// Create `n` books with increasing `createdAt` values, titled `Libro 0..n`
    pub async fn seed_books(&self, n: usize) -> Vec<String> {
        let mut ids = Vec::with_capacity(n);
        for i in 0..n {
            let id = self
                .create(
                    "books",
                    serde_json::json!({
                        "title": format!("Libro {i}"),
                        "author": "Anónimo",
                        "createdAt": format!("2024-01-01T00:{:02}:{:02}Z", i / 60, i % 60),
                    }),
                )
                .await;
            ids.push(id);
        }
        ids
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// Titles of the records listed under `key`
    pub fn titles(&self, key: &str) -> Vec<String> {
        self.body[key]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item["title"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
