//! Route definitions for the Letras HTTP API.
//!
//! All routes are mounted under `/api`. Static routes (`/search`, `/feed`,
//! `/health`, `/{collection}/find`) take priority over the generic
//! collection routes they overlap.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware as axum_middleware,
    routing::get,
};
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let server = state.config.server.clone();

    let api_routes = Router::new()
        .merge(service_routes())
        .merge(collection_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.request_timeout_seconds),
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors::build_cors_layer(&server.cors))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Search, feed, and health
fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(handlers::search::search))
        .route("/feed", get(handlers::feed::feed))
        .route("/health", get(handlers::health::health))
}

/// CRUD, lookup, and relation routes shared by every collection
fn collection_routes() -> Router<AppState> {
    use handlers::collections;

    Router::new()
        .route(
            "/{collection}",
            get(collections::list).post(collections::create),
        )
        .route("/{collection}/find", get(collections::find))
        .route(
            "/{collection}/{id}",
            get(collections::get_one)
                .put(collections::update)
                .patch(collections::update)
                .delete(collections::delete),
        )
        .route("/{collection}/{id}/{child}", get(collections::list_related))
}
