//! Document store trait for pluggable database backends.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::RecordId;
use crate::types::query::DocumentQuery;
use crate::types::record::{Record, StoredRecord};

/// Primitive per-collection document operations offered by a backend
/// (in-memory, PostgreSQL, ...).
///
/// Implementations are schemaless: collections spring into existence on
/// first write and hold arbitrary JSON objects. Single-document writes are
/// atomic; nothing spans documents.
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a record under a store-assigned key and return the key.
    ///
    /// The fields are stored as given; the key is not written into them.
    async fn insert(&self, collection: &str, fields: Record) -> AppResult<RecordId>;

    /// Insert a record under a caller-chosen key.
    ///
    /// Fails with a conflict if the key is already taken.
    async fn insert_with_id(&self, collection: &str, id: &RecordId, fields: Record)
    -> AppResult<()>;

    /// Fetch a record by key. Returns `None` if it does not exist.
    async fn get_one(&self, collection: &str, id: &RecordId) -> AppResult<Option<StoredRecord>>;

    /// Fetch every record of a collection, in no particular order.
    async fn get_many(&self, collection: &str) -> AppResult<Vec<StoredRecord>>;

    /// Run an ordered, optionally filtered and bounded query.
    async fn query(&self, collection: &str, query: &DocumentQuery) -> AppResult<Vec<StoredRecord>>;

    /// Count the records of a collection.
    async fn count(&self, collection: &str) -> AppResult<u64>;

    /// Shallow-merge `fields` into an existing record.
    ///
    /// Fails with a not-found error if the record does not exist.
    async fn patch(&self, collection: &str, id: &RecordId, fields: Record) -> AppResult<()>;

    /// Remove a record. Returns `true` if it existed.
    async fn remove(&self, collection: &str, id: &RecordId) -> AppResult<bool>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
