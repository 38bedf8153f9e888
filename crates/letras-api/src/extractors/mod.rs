//! Custom Axum extractors.

pub mod pagination;

pub use pagination::PaginationParams;
