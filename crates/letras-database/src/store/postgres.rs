//! PostgreSQL document store.
//!
//! All collections share one `documents` table keyed by `(collection, id)`
//! with the fields in a JSONB column. Ordering uses jsonb comparison on the
//! ordering field (missing fields sort as JSON `null`) with ties broken by
//! the id in byte order, matching the in-memory backend.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPool;
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder};

use letras_core::error::{AppError, ErrorKind};
use letras_core::result::AppResult;
use letras_core::traits::DocumentStore;
use letras_core::types::id::RecordId;
use letras_core::types::query::DocumentQuery;
use letras_core::types::record::{ID_FIELD, Record, StoredRecord};
use letras_core::types::sorting::SortDirection;

/// [`DocumentStore`] over a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

type DocumentRow = (String, Json<Record>);

impl PgDocumentStore {
    /// Create a store on an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(message: impl Into<String>, e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, message, e)
}

fn into_stored((id, Json(fields)): DocumentRow) -> AppResult<StoredRecord> {
    Ok(StoredRecord::new(RecordId::parse(id)?, fields))
}

fn push_order_key(builder: &mut QueryBuilder<'_, Postgres>, field: &str) {
    builder.push("COALESCE(fields -> ");
    builder.push_bind(field.to_string());
    builder.push(", 'null'::jsonb)");
}

/// Build the SELECT for a [`DocumentQuery`].
fn build_query<'a>(collection: &str, query: &DocumentQuery) -> QueryBuilder<'a, Postgres> {
    let field = query.order_by.field.as_str();
    let direction = query.order_by.direction.as_sql();

    let mut builder =
        QueryBuilder::<Postgres>::new("SELECT id, fields FROM documents WHERE collection = ");
    builder.push_bind(collection.to_string());

    if let Some(filter) = &query.filter {
        if filter.field == ID_FIELD {
            builder.push(" AND id = ");
            builder.push_bind(filter.value.as_str().unwrap_or_default().to_string());
        } else {
            builder.push(" AND ");
            push_order_key(&mut builder, &filter.field);
            builder.push(" = ");
            builder.push_bind(Json(filter.value.clone()));
        }
    }

    if let Some(cursor) = &query.after {
        let op = match query.order_by.direction {
            SortDirection::Asc => ">",
            SortDirection::Desc => "<",
        };
        builder.push(" AND (");
        push_order_key(&mut builder, field);
        builder.push(", id COLLATE \"C\") ");
        builder.push(op);
        builder.push(" (");
        builder.push_bind(Json(cursor.value.clone()));
        builder.push(", ");
        builder.push_bind(cursor.id.as_str().to_string());
        builder.push(" COLLATE \"C\")");
    }

    builder.push(" ORDER BY ");
    push_order_key(&mut builder, field);
    builder.push(format!(" {direction}, id COLLATE \"C\" {direction}"));

    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }
    builder
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, collection: &str, fields: Record) -> AppResult<RecordId> {
        let id: String = sqlx::query_scalar(
            "INSERT INTO documents (collection, id, fields) \
             VALUES ($1, replace(gen_random_uuid()::text, '-', ''), $2) \
             RETURNING id",
        )
        .bind(collection)
        .bind(Json(fields))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error(format!("Failed to insert into {collection}"), e))?;
        RecordId::parse(id)
    }

    async fn insert_with_id(
        &self,
        collection: &str,
        id: &RecordId,
        fields: Record,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "INSERT INTO documents (collection, id, fields) VALUES ($1, $2, $3) \
             ON CONFLICT (collection, id) DO NOTHING",
        )
        .bind(collection)
        .bind(id.as_str())
        .bind(Json(fields))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error(format!("Failed to insert {collection}/{id}"), e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::conflict(format!(
                "Record {collection}/{id} already exists"
            )));
        }
        Ok(())
    }

    async fn get_one(&self, collection: &str, id: &RecordId) -> AppResult<Option<StoredRecord>> {
        sqlx::query_as::<_, DocumentRow>(
            "SELECT id, fields FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error(format!("Failed to fetch {collection}/{id}"), e))?
        .map(into_stored)
        .transpose()
    }

    async fn get_many(&self, collection: &str) -> AppResult<Vec<StoredRecord>> {
        sqlx::query_as::<_, DocumentRow>(
            "SELECT id, fields FROM documents WHERE collection = $1 ORDER BY id COLLATE \"C\"",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error(format!("Failed to list {collection}"), e))?
        .into_iter()
        .map(into_stored)
        .collect()
    }

    async fn query(&self, collection: &str, query: &DocumentQuery) -> AppResult<Vec<StoredRecord>> {
        let mut builder = build_query(collection, query);
        builder
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error(format!("Failed to query {collection}"), e))?
            .into_iter()
            .map(into_stored)
            .collect()
    }

    async fn count(&self, collection: &str) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = $1")
            .bind(collection)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error(format!("Failed to count {collection}"), e))?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn patch(&self, collection: &str, id: &RecordId, fields: Record) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE documents SET fields = fields || $3, updated_at = NOW() \
             WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id.as_str())
        .bind(Json(Value::Object(fields)))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error(format!("Failed to update {collection}/{id}"), e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Record {collection}/{id} not found"
            )));
        }
        Ok(())
    }

    async fn remove(&self, collection: &str, id: &RecordId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error(format!("Failed to delete {collection}/{id}"), e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| db_error("Health check failed", e))
    }
}
