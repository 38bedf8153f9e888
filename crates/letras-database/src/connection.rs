//! Store construction from configuration.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use letras_core::config::{DatabaseConfig, StoreProvider};
use letras_core::error::{AppError, ErrorKind};
use letras_core::result::AppResult;
use letras_core::traits::DocumentStore;

use crate::store::{MemoryDocumentStore, PgDocumentStore, TimedStore};

/// Open the document store described by `config`.
///
/// PostgreSQL stores have their schema migrated before they are returned.
/// When an operation timeout is configured the store is wrapped in a
/// [`TimedStore`].
pub async fn connect(config: &DatabaseConfig) -> AppResult<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match config.provider {
        StoreProvider::Memory => {
            info!("Using in-memory document store; data will not survive a restart");
            Arc::new(MemoryDocumentStore::new())
        }
        StoreProvider::Postgres => {
            let pool = DatabasePool::connect(config).await?;
            pool.migrate().await?;
            Arc::new(PgDocumentStore::new(pool.into_pool()))
        }
    };

    Ok(match config.operation_timeout() {
        Some(timeout) => Arc::new(TimedStore::new(store, timeout)),
        None => store,
    })
}

/// Wrapper around the sqlx PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open a pool against `config.url`.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        info!(
            url = %mask_password(&config.url),
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to connect to database: {e}"),
                    e,
                )
            })?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Apply pending schema migrations from `migrations/`.
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to run migrations: {e}"),
                    e,
                )
            })?;
        info!("Document schema is up to date");
        Ok(())
    }

    /// Return the underlying sqlx pool (consuming self).
    pub fn into_pool(self) -> PgPool {
        self.pool
    }
}

/// Mask the password portion of a database URL for safe logging.
fn mask_password(url: &str) -> String {
    let Some(at) = url.rfind('@') else {
        return url.to_string();
    };
    let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
    match url[..at].rfind(':') {
        Some(colon) if colon > scheme_end => {
            format!("{}:****@{}", &url[..colon], &url[at + 1..])
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_password() {
        assert_eq!(
            mask_password("postgres://letras:secret@db:5432/letras"),
            "postgres://letras:****@db:5432/letras"
        );
        assert_eq!(
            mask_password("postgres://db:5432/letras"),
            "postgres://db:5432/letras"
        );
        assert_eq!(
            mask_password("postgres://letras@db/letras"),
            "postgres://letras@db/letras"
        );
    }

    #[tokio::test]
    async fn test_memory_provider_connects() {
        let config = DatabaseConfig::default();
        let store = connect(&config).await.expect("memory store");
        assert!(store.health_check().await.expect("health"));
    }
}
