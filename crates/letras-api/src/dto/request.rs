//! Request DTOs with validation.

use serde::Deserialize;
use validator::Validate;

/// Query string of `GET /api/{collection}/find`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FindParams {
    /// Lookup field.
    #[validate(length(min = 1, message = "field is required"))]
    pub field: String,
    /// Value the field must equal.
    #[validate(length(min = 1, message = "value is required"))]
    pub value: String,
}

/// Query string of `GET /api/search`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchParams {
    /// Text to look for.
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "q must be 1 to 200 characters"))]
    pub q: String,
    /// Restrict the search to one collection.
    pub collection: Option<String>,
}
