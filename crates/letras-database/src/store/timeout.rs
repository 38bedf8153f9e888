//! Per-call timeout decorator for document stores.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use letras_core::error::AppError;
use letras_core::result::AppResult;
use letras_core::traits::DocumentStore;
use letras_core::types::id::RecordId;
use letras_core::types::query::DocumentQuery;
use letras_core::types::record::{Record, StoredRecord};

/// Wraps another store and fails any call that outlives `timeout` with a
/// [`Timeout`](letras_core::error::ErrorKind::Timeout) error.
///
/// A timed-out write may still complete in the backend.
#[derive(Debug, Clone)]
pub struct TimedStore {
    inner: Arc<dyn DocumentStore>,
    timeout: Duration,
}

impl TimedStore {
    /// Wrap `inner` with the given per-call timeout.
    pub fn new(inner: Arc<dyn DocumentStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn guard<T>(
        &self,
        operation: &'static str,
        collection: &str,
        fut: impl Future<Output = AppResult<T>> + Send,
    ) -> AppResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                let millis = self.timeout.as_millis();
                warn!(operation, collection, timeout_ms = %millis, "Store call timed out");
                Err(AppError::timeout(format!(
                    "Store {operation} on '{collection}' did not complete within {millis}ms"
                )))
            }
        }
    }
}

#[async_trait]
impl DocumentStore for TimedStore {
    async fn insert(&self, collection: &str, fields: Record) -> AppResult<RecordId> {
        self.guard("insert", collection, self.inner.insert(collection, fields))
            .await
    }

    async fn insert_with_id(
        &self,
        collection: &str,
        id: &RecordId,
        fields: Record,
    ) -> AppResult<()> {
        self.guard(
            "insert",
            collection,
            self.inner.insert_with_id(collection, id, fields),
        )
        .await
    }

    async fn get_one(&self, collection: &str, id: &RecordId) -> AppResult<Option<StoredRecord>> {
        self.guard("get", collection, self.inner.get_one(collection, id))
            .await
    }

    async fn get_many(&self, collection: &str) -> AppResult<Vec<StoredRecord>> {
        self.guard("scan", collection, self.inner.get_many(collection))
            .await
    }

    async fn query(&self, collection: &str, query: &DocumentQuery) -> AppResult<Vec<StoredRecord>> {
        self.guard("query", collection, self.inner.query(collection, query))
            .await
    }

    async fn count(&self, collection: &str) -> AppResult<u64> {
        self.guard("count", collection, self.inner.count(collection))
            .await
    }

    async fn patch(&self, collection: &str, id: &RecordId, fields: Record) -> AppResult<()> {
        self.guard("patch", collection, self.inner.patch(collection, id, fields))
            .await
    }

    async fn remove(&self, collection: &str, id: &RecordId) -> AppResult<bool> {
        self.guard("remove", collection, self.inner.remove(collection, id))
            .await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.guard("health_check", "*", self.inner.health_check())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryDocumentStore;
    use letras_core::error::ErrorKind;

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_times_out() {
        let memory = MemoryDocumentStore::new();
        memory.set_latency(Duration::from_secs(5));
        let store = TimedStore::new(Arc::new(memory), Duration::from_millis(100));

        let err = store.count("books").await.expect_err("timeout");
        assert_eq!(err.kind, ErrorKind::Timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_call_passes_through() {
        let store = TimedStore::new(
            Arc::new(MemoryDocumentStore::new()),
            Duration::from_millis(100),
        );
        assert_eq!(store.count("books").await.expect("count"), 0);
    }
}
