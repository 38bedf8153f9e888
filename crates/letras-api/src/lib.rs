//! # letras-api
//!
//! HTTP API layer for Letras Documental built on Axum.
//!
//! Every collection is served by the same generic handlers over the
//! [`CollectionRepository`](letras_database::CollectionRepository), plus
//! search, the merged feed, and a health check.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
