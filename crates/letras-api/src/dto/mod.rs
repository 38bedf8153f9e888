//! Data transfer objects for requests and responses.

pub mod request;
pub mod response;

pub use request::{FindParams, SearchParams};
pub use response::ApiResponse;
