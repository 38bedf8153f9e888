//! Generic collection repository.
//!
//! Every collection in the application is read and written through
//! [`CollectionRepository`]; it knows nothing about individual schemas. It
//! layers id assignment, created-at stamping, pagination, and error logging
//! on top of the primitive [`DocumentStore`] operations.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use letras_core::config::{BackfillConfig, CreateStrategy, DatabaseConfig};
use letras_core::error::{AppError, ErrorKind};
use letras_core::result::AppResult;
use letras_core::traits::DocumentStore;
use letras_core::types::id::RecordId;
use letras_core::types::pagination::Page;
use letras_core::types::query::{Cursor, DocumentQuery, FieldFilter};
use letras_core::types::record::{ID_FIELD, Record, StoredRecord};
use letras_core::types::sorting::SortField;

/// Result of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// The record existed and was removed.
    Deleted,
    /// There was no record with that id.
    AlreadyAbsent,
}

/// Uniform CRUD and pagination over any collection of a [`DocumentStore`].
#[derive(Debug, Clone)]
pub struct CollectionRepository {
    store: Arc<dyn DocumentStore>,
    order_field: String,
    created_at_field: String,
    create_strategy: CreateStrategy,
    backfill: BackfillConfig,
}

impl CollectionRepository {
    /// Create a repository over `store` with the behaviour set in `config`.
    pub fn new(store: Arc<dyn DocumentStore>, config: &DatabaseConfig) -> Self {
        Self {
            store,
            order_field: config.order_field.clone(),
            created_at_field: config.created_at_field.clone(),
            create_strategy: config.create_strategy,
            backfill: config.backfill.clone(),
        }
    }

    /// Field records are ordered by when paginating.
    pub fn order_field(&self) -> &str {
        &self.order_field
    }

    /// Field stamped with the creation time on create.
    pub fn created_at_field(&self) -> &str {
        &self.created_at_field
    }

    /// Insert a new record and return its id.
    ///
    /// `data` must not contain an `id`. The created-at field is stamped with
    /// the current time unless already present. Under
    /// [`CreateStrategy::TwoPhase`] a failed id backfill is retried with
    /// backoff and finally reported as [`ErrorKind::PartialWrite`]; the record
    /// stays in the store without its `id` field.
    pub async fn create(&self, collection: &str, mut data: Record) -> AppResult<RecordId> {
        check_collection(collection)?;
        if data.contains_key(ID_FIELD) {
            return Err(AppError::validation(
                "New records must not carry an id; one is assigned on create",
            ));
        }
        data.entry(self.created_at_field.clone())
            .or_insert_with(|| Value::String(timestamp_now()));

        let id = match self.create_strategy {
            CreateStrategy::ClientId => {
                let id = RecordId::generate();
                data.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
                self.store
                    .insert_with_id(collection, &id, data)
                    .await
                    .inspect_err(|e| log_failure("create", collection, e))?;
                id
            }
            CreateStrategy::TwoPhase => {
                let id = self
                    .store
                    .insert(collection, data)
                    .await
                    .inspect_err(|e| log_failure("create", collection, e))?;
                self.backfill_id(collection, &id).await?;
                id
            }
        };

        info!(collection, id = %id, "Record created");
        Ok(id)
    }

    /// Write `id` back onto a record inserted under a store-assigned key.
    /// Only transient store errors are retried.
    async fn backfill_id(&self, collection: &str, id: &RecordId) -> AppResult<()> {
        let max_attempts = self.backfill.max_attempts.max(1);
        let mut last_error = None;
        let mut attempts = 0;

        for attempt in 1..=max_attempts {
            attempts = attempt;
            let delay = self.backfill.delay_before(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let mut patch = Record::new();
            patch.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
            match self.store.patch(collection, id, patch).await {
                Ok(()) => {
                    if attempt > 1 {
                        info!(collection, id = %id, attempt, "Id backfill succeeded after retry");
                    }
                    return Ok(());
                }
                Err(e) => {
                    warn!(collection, id = %id, attempt, error = %e, "Id backfill attempt failed");
                    let transient = e.is_transient();
                    last_error = Some(e);
                    if !transient {
                        break;
                    }
                }
            }
        }

        error!(
            collection,
            id = %id,
            attempts,
            "Partial write: record stored without its id field"
        );
        let message = format!(
            "Record {collection}/{id} was stored but its id could not be written back \
             after {attempts} attempt(s)"
        );
        Err(match last_error {
            Some(cause) => AppError::with_source(ErrorKind::PartialWrite, message, cause),
            None => AppError::partial_write(message),
        })
    }

    /// Point lookup by id. `Ok(None)` when the record does not exist.
    pub async fn get_by_id(&self, collection: &str, id: &str) -> AppResult<Option<Record>> {
        check_collection(collection)?;
        let id = RecordId::parse(id)?;
        let found = self
            .store
            .get_one(collection, &id)
            .await
            .inspect_err(|e| log_failure("get_by_id", collection, e))?;
        Ok(found.map(StoredRecord::into_record))
    }

    /// First record whose `field` equals `value`.
    ///
    /// When several records match, the first by the ordering field (then id)
    /// is returned.
    pub async fn get_by_field(
        &self,
        collection: &str,
        field: &str,
        value: impl Into<Value>,
    ) -> AppResult<Option<Record>> {
        check_collection(collection)?;
        check_field(field)?;
        let query = DocumentQuery::ordered_by(SortField::asc(&self.order_field))
            .filter(FieldFilter::eq(field, value))
            .limit(1);
        let found = self
            .store
            .query(collection, &query)
            .await
            .inspect_err(|e| log_failure("get_by_field", collection, e))?;
        Ok(found.into_iter().next().map(StoredRecord::into_record))
    }

    /// Every record whose `field` equals `value`, oldest first.
    pub async fn get_by_relation(
        &self,
        collection: &str,
        field: &str,
        value: impl Into<Value>,
    ) -> AppResult<Vec<Record>> {
        check_collection(collection)?;
        check_field(field)?;
        let query = DocumentQuery::ordered_by(SortField::asc(&self.created_at_field))
            .filter(FieldFilter::eq(field, value));
        let found = self
            .store
            .query(collection, &query)
            .await
            .inspect_err(|e| log_failure("get_by_relation", collection, e))?;
        Ok(found.into_iter().map(StoredRecord::into_record).collect())
    }

    /// Every record of the collection, ordered by the ordering field.
    ///
    /// Unbounded; only meant for small collections.
    pub async fn get_all(&self, collection: &str) -> AppResult<Vec<Record>> {
        check_collection(collection)?;
        let records = self
            .store
            .get_many(collection)
            .await
            .inspect_err(|e| log_failure("get_all", collection, e))?;
        let ordered = DocumentQuery::ordered_by(SortField::asc(&self.order_field)).apply(records);
        Ok(ordered.into_iter().map(StoredRecord::into_record).collect())
    }

    /// The `limit` most recently created records, newest first.
    ///
    /// Ordered by the created-at field descending, then id descending.
    pub async fn get_newest(&self, collection: &str, limit: u64) -> AppResult<Vec<Record>> {
        check_collection(collection)?;
        let query = DocumentQuery::ordered_by(SortField::desc(&self.created_at_field)).limit(limit);
        let found = self
            .store
            .query(collection, &query)
            .await
            .inspect_err(|e| log_failure("get_newest", collection, e))?;
        Ok(found.into_iter().map(StoredRecord::into_record).collect())
    }

    /// One page of the collection.
    ///
    /// Page 1 is read directly. Later pages first read and discard the
    /// `(page - 1) * limit` preceding records, then resume strictly after the
    /// last of them. A page past the end is empty. The count is taken before
    /// the page is read, so concurrent writes may make the two disagree.
    pub async fn get_page(&self, collection: &str, page: u64, limit: u64) -> AppResult<Page<Record>> {
        check_collection(collection)?;
        if page == 0 {
            return Err(AppError::validation("Page numbers start at 1"));
        }
        if limit == 0 {
            return Err(AppError::validation("Page limit must be at least 1"));
        }

        let total_count = self
            .store
            .count(collection)
            .await
            .inspect_err(|e| log_failure("count", collection, e))?;

        let ordered = DocumentQuery::ordered_by(SortField::asc(&self.order_field));
        let fetched = if page == 1 {
            self.store.query(collection, &ordered.limit(limit)).await
        } else {
            self.read_after_discard(collection, ordered, page, limit).await
        };
        let records = fetched.inspect_err(|e| log_failure("get_page", collection, e))?;

        debug!(
            collection,
            page,
            limit,
            total_count,
            returned = records.len(),
            "Page read"
        );
        Ok(Page::new(records, page, limit, total_count).map(StoredRecord::into_record))
    }

    async fn read_after_discard(
        &self,
        collection: &str,
        ordered: DocumentQuery,
        page: u64,
        limit: u64,
    ) -> AppResult<Vec<StoredRecord>> {
        let skip = (page - 1).saturating_mul(limit);
        let prior = self
            .store
            .query(collection, &ordered.clone().limit(skip))
            .await?;

        match prior.last() {
            Some(last) if prior.len() as u64 == skip => {
                let cursor = Cursor::at(last, &self.order_field);
                self.store
                    .query(collection, &ordered.after(cursor).limit(limit))
                    .await
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Shallow-merge `changes` into an existing record.
    ///
    /// An `id` in `changes` is accepted only if it equals `id`. Fails with
    /// [`ErrorKind::NotFound`] when the record does not exist.
    pub async fn update(&self, collection: &str, id: &str, mut changes: Record) -> AppResult<()> {
        check_collection(collection)?;
        let id = RecordId::parse(id)?;
        if let Some(body_id) = changes.remove(ID_FIELD) {
            if body_id.as_str() != Some(id.as_str()) {
                return Err(AppError::validation("A record's id cannot be changed"));
            }
        }
        if changes.is_empty() {
            return Err(AppError::validation("Update must contain at least one field"));
        }

        self.store
            .patch(collection, &id, changes)
            .await
            .inspect_err(|e| log_failure("update", collection, e))?;
        info!(collection, id = %id, "Record updated");
        Ok(())
    }

    /// Remove a record. Removing an absent record is not an error.
    pub async fn delete(&self, collection: &str, id: &str) -> AppResult<DeleteOutcome> {
        check_collection(collection)?;
        let id = RecordId::parse(id)?;
        let existed = self
            .store
            .remove(collection, &id)
            .await
            .inspect_err(|e| log_failure("delete", collection, e))?;
        let outcome = if existed {
            DeleteOutcome::Deleted
        } else {
            DeleteOutcome::AlreadyAbsent
        };
        info!(collection, id = %id, ?outcome, "Record delete");
        Ok(outcome)
    }

    /// Number of records in the collection.
    pub async fn count(&self, collection: &str) -> AppResult<u64> {
        check_collection(collection)?;
        self.store
            .count(collection)
            .await
            .inspect_err(|e| log_failure("count", collection, e))
    }

    /// Records with a string field containing `query`, case-insensitively.
    ///
    /// Only `fields` are inspected. When `fields` is empty every top-level
    /// string field except the id and created-at stamp is. Scans the whole
    /// collection.
    pub async fn search(
        &self,
        collection: &str,
        query: &str,
        fields: &[&str],
    ) -> AppResult<Vec<Record>> {
        check_collection(collection)?;
        let needle = query.trim().to_lowercase();
        let records = self
            .store
            .get_many(collection)
            .await
            .inspect_err(|e| log_failure("search", collection, e))?;

        let skipped = [ID_FIELD, self.created_at_field.as_str()];
        let matched = records
            .into_iter()
            .filter(|record| matches_text(record, &needle, fields, &skipped));
        let ordered = DocumentQuery::ordered_by(SortField::asc(&self.order_field)).apply(matched);
        debug!(collection, query, matches = ordered.len(), "Search");
        Ok(ordered.into_iter().map(StoredRecord::into_record).collect())
    }

    /// Whether the underlying store is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.store.health_check().await
    }
}

fn matches_text(record: &StoredRecord, needle: &str, fields: &[&str], skipped: &[&str]) -> bool {
    let contains = |value: &Value| {
        value
            .as_str()
            .is_some_and(|s| s.to_lowercase().contains(needle))
    };
    if fields.is_empty() {
        record
            .fields
            .iter()
            .filter(|(name, _)| !skipped.contains(&name.as_str()))
            .any(|(_, value)| contains(value))
    } else {
        fields.iter().any(|f| contains(record.field(f)))
    }
}

fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn check_collection(collection: &str) -> AppResult<()> {
    if collection.trim().is_empty() {
        return Err(AppError::validation("Collection name must not be empty"));
    }
    Ok(())
}

fn check_field(field: &str) -> AppResult<()> {
    if field.trim().is_empty() {
        return Err(AppError::validation("Field name must not be empty"));
    }
    Ok(())
}

fn log_failure(operation: &'static str, collection: &str, err: &AppError) {
    if !err.kind.is_client_error() {
        error!(operation, collection, kind = %err.kind, error = %err, "Store operation failed");
    }
}
