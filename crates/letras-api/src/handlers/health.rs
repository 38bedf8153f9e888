//! Health check handler.

use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use crate::dto::response::ApiResponse;
use crate::state::AppState;

/// GET /api/health
///
/// Reports 503 when the document store does not answer.
pub async fn health(State(state): State<AppState>) -> ApiResponse {
    let store_up = match state.repository.health_check().await {
        Ok(up) => up,
        Err(e) => {
            warn!(error = %e, "Store health check failed");
            false
        }
    };

    let (status, store) = if store_up {
        (StatusCode::OK, "up")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "down")
    };
    ApiResponse::with_status(status)
        .with("health", if store_up { "ok" } else { "degraded" })
        .with("store", store)
        .with("version", env!("CARGO_PKG_VERSION"))
}
