//! Generic collection handlers.
//!
//! One set of handlers serves every collection in
//! [`letras_core::collections::COLLECTIONS`]; the path's `{collection}`
//! segment selects the descriptor that supplies envelope keys and
//! validation rules.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde_json::Value;
use validator::{Validate, ValidateEmail};

use letras_core::collections::{self, CollectionSpec};
use letras_core::error::AppError;
use letras_core::types::record::{ID_FIELD, Record, record_from_value};
use letras_database::DeleteOutcome;

use crate::dto::request::FindParams;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::PaginationParams;
use crate::state::AppState;

const USERS: &str = "users";
const EMAIL_FIELD: &str = "email";

/// Resolve a path segment to a collection descriptor.
pub(crate) fn resolve(name: &str) -> Result<&'static CollectionSpec, ApiError> {
    collections::find(name)
        .ok_or_else(|| AppError::not_found(format!("Unknown collection '{name}'")).into())
}

fn body_record(body: Value) -> Result<Record, ApiError> {
    record_from_value(body)
        .ok_or_else(|| AppError::validation("Request body must be a JSON object").into())
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// GET /api/{collection}
pub async fn list(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<ApiResponse, ApiError> {
    let spec = resolve(&collection)?;

    if params.all {
        if !spec.bounded {
            return Err(AppError::validation(format!(
                "'{}' is too large to list in full; use page and limit",
                spec.name
            ))
            .into());
        }
        let records = state.repository.get_all(spec.name).await?;
        let total = records.len();
        return Ok(ApiResponse::ok()
            .with(spec.name, records)
            .with("totalCount", total));
    }

    let pagination = &state.config.pagination;
    let default_limit = spec.default_limit.unwrap_or(pagination.default_limit);
    let request = params.into_page_request(default_limit, pagination.max_limit);
    let page = state
        .repository
        .get_page(spec.name, request.page, request.limit)
        .await?;
    Ok(ApiResponse::ok().page(spec.name, page))
}

/// GET /api/{collection}/{id}
pub async fn get_one(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<ApiResponse, ApiError> {
    let spec = resolve(&collection)?;
    let record = state
        .repository
        .get_by_id(spec.name, &id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("{} not found", capitalized(spec.singular))))?;
    Ok(ApiResponse::ok().with(spec.singular, record))
}

/// GET /api/{collection}/find?field=..&value=..
pub async fn find(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Query(params): Query<FindParams>,
) -> Result<ApiResponse, ApiError> {
    let spec = resolve(&collection)?;
    params.validate()?;
    if !spec.is_lookup_field(&params.field) {
        return Err(AppError::validation(format!(
            "'{}' cannot be looked up by '{}'",
            spec.name, params.field
        ))
        .into());
    }

    let record = state
        .repository
        .get_by_field(spec.name, &params.field, params.value)
        .await?
        .ok_or_else(|| AppError::not_found(format!("{} not found", capitalized(spec.singular))))?;
    Ok(ApiResponse::ok().with(spec.singular, record))
}

/// GET /api/{collection}/{id}/{child}
pub async fn list_related(
    State(state): State<AppState>,
    Path((collection, id, child)): Path<(String, String, String)>,
) -> Result<ApiResponse, ApiError> {
    let parent = resolve(&collection)?;
    let relation = collections::relation(parent.name, &child).ok_or_else(|| {
        AppError::not_found(format!("'{}' has no related '{child}'", parent.name))
    })?;

    if state.repository.get_by_id(parent.name, &id).await?.is_none() {
        return Err(
            AppError::not_found(format!("{} not found", capitalized(parent.singular))).into(),
        );
    }

    let records = state
        .repository
        .get_by_relation(relation.child, relation.field, id.as_str())
        .await?;
    let total = records.len();
    Ok(ApiResponse::ok()
        .with(relation.child, records)
        .with("totalCount", total))
}

/// POST /api/{collection}
pub async fn create(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Json(body): Json<Value>,
) -> Result<ApiResponse, ApiError> {
    let spec = resolve(&collection)?;
    let fields = body_record(body)?;
    spec.validate_new(&fields)?;
    if spec.name == USERS {
        check_email(&state, &fields, None).await?;
    }

    let id = state.repository.create(spec.name, fields).await?;
    Ok(ApiResponse::created()
        .message(format!("{} created", capitalized(spec.singular)))
        .with(ID_FIELD, id.into_string()))
}

/// PUT|PATCH /api/{collection}/{id}
pub async fn update(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<ApiResponse, ApiError> {
    let spec = resolve(&collection)?;
    let fields = body_record(body)?;
    spec.validate_patch(&fields)?;
    if spec.name == USERS && fields.contains_key(EMAIL_FIELD) {
        check_email(&state, &fields, Some(&id)).await?;
    }

    state.repository.update(spec.name, &id, fields).await?;
    Ok(ApiResponse::ok()
        .message(format!("{} updated", capitalized(spec.singular)))
        .with(ID_FIELD, id))
}

/// DELETE /api/{collection}/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<ApiResponse, ApiError> {
    let spec = resolve(&collection)?;
    let outcome = state.repository.delete(spec.name, &id).await?;
    let message = match outcome {
        DeleteOutcome::Deleted => format!("{} deleted", capitalized(spec.singular)),
        DeleteOutcome::AlreadyAbsent => {
            format!("{} was already absent", capitalized(spec.singular))
        }
    };
    let outcome = match outcome {
        DeleteOutcome::Deleted => "deleted",
        DeleteOutcome::AlreadyAbsent => "already_absent",
    };
    Ok(ApiResponse::ok()
        .message(message)
        .with(ID_FIELD, id)
        .with("outcome", outcome))
}

/// Users need a well-formed email no other user has.
async fn check_email(
    state: &AppState,
    fields: &Record,
    current_id: Option<&str>,
) -> Result<(), ApiError> {
    let email = fields
        .get(EMAIL_FIELD)
        .and_then(Value::as_str)
        .filter(|e| e.validate_email())
        .ok_or_else(|| AppError::validation("email must be a valid email address"))?;

    let existing = state
        .repository
        .get_by_field(USERS, EMAIL_FIELD, email)
        .await?;
    let taken = existing.is_some_and(|user| {
        current_id.is_none_or(|id| user.get(ID_FIELD).and_then(Value::as_str) != Some(id))
    });
    if taken {
        return Err(AppError::conflict(format!("A user with email {email} already exists")).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalized() {
        assert_eq!(capitalized("prestamo"), "Prestamo");
        assert_eq!(capitalized(""), "");
    }

    #[test]
    fn test_resolve_unknown_collection() {
        let err = resolve("files").expect_err("unknown");
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
    }
}
