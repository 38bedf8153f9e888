//! Activity feed: posts and events merged, newest first.

use std::cmp::Ordering;

use axum::extract::{Query, State};
use serde_json::Value;

use letras_core::types::ordering::compare_values;
use letras_core::types::pagination::Page;
use letras_core::types::record::{ID_FIELD, Record};

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::PaginationParams;
use crate::state::AppState;

/// Collections merged into the feed, with the `type` tag their items get.
const FEED_SOURCES: &[(&str, &str)] = &[("posts", "post"), ("events", "event")];

/// GET /api/feed?page=..&limit=..
///
/// Each source contributes only its newest `page * limit` records; the
/// requested page lies within the merge of those prefixes.
pub async fn feed(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<ApiResponse, ApiError> {
    let pagination = &state.config.pagination;
    let request = params.into_page_request(pagination.default_limit, pagination.max_limit);
    let created_at = state.repository.created_at_field();

    let mut total_count = 0;
    for (collection, _) in FEED_SOURCES {
        total_count += state.repository.count(collection).await?;
    }

    let mut items: Vec<Record> = Vec::new();
    if request.offset() < total_count {
        let prefix = request.page.saturating_mul(request.limit);
        for (collection, kind) in FEED_SOURCES {
            for mut record in state.repository.get_newest(collection, prefix).await? {
                record.insert("type".to_string(), Value::from(*kind));
                items.push(record);
            }
        }
        items.sort_by(|a, b| newest_first(a, b, created_at));
    }

    Ok(ApiResponse::ok().page("feed", Page::from_prefix(items, &request, total_count)))
}

fn newest_first(a: &Record, b: &Record, created_at: &str) -> Ordering {
    let field = |r: &Record, name: &str| r.get(name).cloned().unwrap_or(Value::Null);
    compare_values(&field(b, created_at), &field(a, created_at))
        .then_with(|| compare_values(&field(b, ID_FIELD), &field(a, ID_FIELD)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_newest_first() {
        let old = json!({ "id": "a", "createdAt": "2024-01-01T00:00:00Z" });
        let new = json!({ "id": "b", "createdAt": "2024-06-01T00:00:00Z" });
        let (old, new) = (
            old.as_object().cloned().expect("object"),
            new.as_object().cloned().expect("object"),
        );
        assert_eq!(newest_first(&new, &old, "createdAt"), Ordering::Less);
        assert_eq!(newest_first(&old, &new, "createdAt"), Ordering::Greater);
    }
}
