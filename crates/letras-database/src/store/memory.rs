//! In-memory document store backed by dashmap.
//!
//! Used for development, tests, and single-node deployments that can afford
//! to lose their data on restart. Supports injecting failures and latency so
//! the repository's error paths can be exercised without a real backend.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use letras_core::error::AppError;
use letras_core::result::AppResult;
use letras_core::traits::DocumentStore;
use letras_core::types::id::RecordId;
use letras_core::types::query::DocumentQuery;
use letras_core::types::record::{Record, StoredRecord, merge_shallow};

/// A primitive store operation, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// [`DocumentStore::insert`].
    Insert,
    /// [`DocumentStore::insert_with_id`].
    InsertWithId,
    /// [`DocumentStore::get_one`].
    GetOne,
    /// [`DocumentStore::get_many`].
    GetMany,
    /// [`DocumentStore::query`].
    Query,
    /// [`DocumentStore::count`].
    Count,
    /// [`DocumentStore::patch`].
    Patch,
    /// [`DocumentStore::remove`].
    Remove,
    /// [`DocumentStore::health_check`].
    HealthCheck,
}

/// Process-local [`DocumentStore`].
///
/// Cloning is cheap and clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    /// Collection name to records keyed by id.
    collections: Arc<DashMap<String, BTreeMap<RecordId, Record>>>,
    /// Remaining injected failures per operation.
    failures: Arc<DashMap<StoreOp, u32>>,
    /// Artificial delay applied to every call, in milliseconds.
    latency_ms: Arc<AtomicU64>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `times` calls of `op` fail with a database error.
    pub fn fail_next(&self, op: StoreOp, times: u32) {
        self.failures.insert(op, times);
    }

    /// Make every call of `op` fail until [`clear_failures`](Self::clear_failures).
    pub fn fail_always(&self, op: StoreOp) {
        self.failures.insert(op, u32::MAX);
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        self.failures.clear();
    }

    /// Delay every subsequent call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(millis, Ordering::Relaxed);
    }

    async fn enter(&self, op: StoreOp) -> AppResult<()> {
        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        let mut injected = false;
        if let Some(mut remaining) = self.failures.get_mut(&op) {
            if *remaining > 0 {
                if *remaining != u32::MAX {
                    *remaining -= 1;
                }
                injected = true;
            }
        }
        if injected {
            debug!(?op, "Injected store failure");
            return Err(AppError::database(format!("Injected failure on {op:?}")));
        }
        Ok(())
    }

    fn snapshot(&self, collection: &str) -> Vec<StoredRecord> {
        self.collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .map(|(id, fields)| StoredRecord::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: &str, fields: Record) -> AppResult<RecordId> {
        self.enter(StoreOp::Insert).await?;
        let id = RecordId::generate();
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    async fn insert_with_id(
        &self,
        collection: &str,
        id: &RecordId,
        fields: Record,
    ) -> AppResult<()> {
        self.enter(StoreOp::InsertWithId).await?;
        let mut records = self.collections.entry(collection.to_string()).or_default();
        if records.contains_key(id) {
            return Err(AppError::conflict(format!(
                "Record {collection}/{id} already exists"
            )));
        }
        records.insert(id.clone(), fields);
        Ok(())
    }

    async fn get_one(&self, collection: &str, id: &RecordId) -> AppResult<Option<StoredRecord>> {
        self.enter(StoreOp::GetOne).await?;
        Ok(self.collections.get(collection).and_then(|records| {
            records
                .get(id)
                .map(|fields| StoredRecord::new(id.clone(), fields.clone()))
        }))
    }

    async fn get_many(&self, collection: &str) -> AppResult<Vec<StoredRecord>> {
        self.enter(StoreOp::GetMany).await?;
        Ok(self.snapshot(collection))
    }

    async fn query(&self, collection: &str, query: &DocumentQuery) -> AppResult<Vec<StoredRecord>> {
        self.enter(StoreOp::Query).await?;
        Ok(query.apply(self.snapshot(collection)))
    }

    async fn count(&self, collection: &str) -> AppResult<u64> {
        self.enter(StoreOp::Count).await?;
        Ok(self
            .collections
            .get(collection)
            .map(|records| records.len() as u64)
            .unwrap_or(0))
    }

    async fn patch(&self, collection: &str, id: &RecordId, fields: Record) -> AppResult<()> {
        self.enter(StoreOp::Patch).await?;
        let mut records = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| AppError::not_found(format!("Record {collection}/{id} not found")))?;
        let existing = records
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("Record {collection}/{id} not found")))?;
        merge_shallow(existing, fields);
        Ok(())
    }

    async fn remove(&self, collection: &str, id: &RecordId) -> AppResult<bool> {
        self.enter(StoreOp::Remove).await?;
        Ok(self
            .collections
            .get_mut(collection)
            .is_some_and(|mut records| records.remove(id).is_some()))
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.enter(StoreOp::HealthCheck).await?;
        Ok(true)
    }
}
