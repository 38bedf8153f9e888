//! Cross-collection text search handler.

use axum::extract::{Query, State};
use serde_json::{Map, Value};
use validator::Validate;

use letras_core::collections::{COLLECTIONS, CollectionSpec};
use letras_core::error::AppError;

use crate::dto::request::SearchParams;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::handlers::collections::resolve;
use crate::state::AppState;

/// GET /api/search?q=..&collection=..
///
/// Case-insensitive substring match over each collection's searchable
/// fields. Results are grouped by collection name.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<ApiResponse, ApiError> {
    params.validate()?;
    let query = params.q.trim();
    if query.is_empty() {
        return Err(AppError::validation("q must not be blank").into());
    }

    let targets: Vec<&'static CollectionSpec> = match params.collection.as_deref() {
        Some(name) => {
            let spec = resolve(name)?;
            if spec.searchable_fields.is_empty() {
                return Err(
                    AppError::validation(format!("'{}' is not searchable", spec.name)).into(),
                );
            }
            vec![spec]
        }
        None => COLLECTIONS
            .iter()
            .filter(|spec| !spec.searchable_fields.is_empty())
            .collect(),
    };

    let mut results = Map::new();
    let mut total = 0usize;
    for spec in targets {
        let hits = state
            .repository
            .search(spec.name, query, spec.searchable_fields)
            .await?;
        total += hits.len();
        results.insert(spec.name.to_string(), Value::from(hits));
    }

    Ok(ApiResponse::ok()
        .with("query", query)
        .with("results", results)
        .with("totalCount", total))
}
