//! Response envelope.
//!
//! Every response body is a JSON object carrying the HTTP status, an
//! optional message, and the payload under a domain-specific key:
//! `{ "status": 200, "message": "...", "book": { ... } }`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value};

use letras_core::types::pagination::Page;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    /// HTTP status code, repeated in the body.
    pub status: u16,
    /// Optional human-readable message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Payload entries, flattened into the top-level object.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl ApiResponse {
    /// Empty envelope with the given status.
    pub fn with_status(status: StatusCode) -> Self {
        Self {
            status: status.as_u16(),
            message: None,
            payload: Map::new(),
        }
    }

    /// `200 OK`.
    pub fn ok() -> Self {
        Self::with_status(StatusCode::OK)
    }

    /// `201 Created`.
    pub fn created() -> Self {
        Self::with_status(StatusCode::CREATED)
    }

    /// Set the message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Add a payload entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Add a page: the items under `key` plus `totalCount`, `currentPage`,
    /// `limit`, and `totalPages`.
    pub fn page<T: Into<Value>>(self, key: impl Into<String>, page: Page<T>) -> Self {
        let data: Vec<Value> = page.data.into_iter().map(Into::into).collect();
        self.with(key, data)
            .with("totalCount", page.total_count)
            .with("currentPage", page.current_page)
            .with("limit", page.limit)
            .with("totalPages", page.total_pages)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_flattens_payload() {
        let body = serde_json::to_value(
            ApiResponse::ok()
                .message("Book found")
                .with("book", json!({ "id": "b1" })),
        )
        .expect("serialize");
        assert_eq!(
            body,
            json!({ "status": 200, "message": "Book found", "book": { "id": "b1" } })
        );
    }

    #[test]
    fn test_message_is_optional() {
        let body = serde_json::to_value(ApiResponse::ok().with("count", 3)).expect("serialize");
        assert!(body.get("message").is_none());
    }

    #[test]
    fn test_page_metadata() {
        let page = Page::new(vec![json!({ "id": "a" }), json!({ "id": "b" })], 2, 2, 5);
        let body = serde_json::to_value(ApiResponse::ok().page("books", page)).expect("serialize");
        assert_eq!(body["books"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["totalCount"], 5);
        assert_eq!(body["currentPage"], 2);
        assert_eq!(body["limit"], 2);
        assert_eq!(body["totalPages"], 3);
    }
}
