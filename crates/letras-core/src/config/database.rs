//! Document store configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which document store backend to connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreProvider {
    /// Process-local store; contents are lost on restart.
    Memory,
    /// PostgreSQL with a JSONB documents table.
    Postgres,
}

/// How `create` assigns identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateStrategy {
    /// Generate the id before writing and store the record in one write.
    ClientId,
    /// Let the store assign the id, then write it back onto the record.
    TwoPhase,
}

/// Retry policy for the id backfill of a two-phase create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackfillConfig {
    /// Total attempts, including the first.
    #[serde(default = "default_backfill_attempts")]
    pub max_attempts: u32,
    /// Delay before the second attempt in milliseconds; doubles afterwards.
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,
    /// Ceiling for the delay between attempts in milliseconds.
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_backfill_attempts(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

impl BackfillConfig {
    /// Delay to wait before attempt number `attempt` (1-based).
    ///
    /// The first attempt runs immediately.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exponent = (attempt - 2).min(16);
        let millis = self
            .initial_backoff_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }
}

/// Document store connection and behaviour configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Backend to use.
    #[serde(default = "default_provider")]
    pub provider: StoreProvider,
    /// PostgreSQL connection URL (postgres provider only).
    #[serde(default)]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Upper bound for a single store call in milliseconds (0 disables).
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_ms: u64,
    /// Identifier assignment strategy for `create`.
    #[serde(default = "default_create_strategy")]
    pub create_strategy: CreateStrategy,
    /// Backfill retry policy for [`CreateStrategy::TwoPhase`].
    #[serde(default)]
    pub backfill: BackfillConfig,
    /// Field used to order records when paginating.
    #[serde(default = "default_order_field")]
    pub order_field: String,
    /// Field stamped with the creation time when a record is created.
    #[serde(default = "default_created_at_field")]
    pub created_at_field: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            operation_timeout_ms: default_operation_timeout(),
            create_strategy: default_create_strategy(),
            backfill: BackfillConfig::default(),
            order_field: default_order_field(),
            created_at_field: default_created_at_field(),
        }
    }
}

impl DatabaseConfig {
    /// The per-call store timeout, if enabled.
    pub fn operation_timeout(&self) -> Option<Duration> {
        (self.operation_timeout_ms > 0).then(|| Duration::from_millis(self.operation_timeout_ms))
    }
}

fn default_provider() -> StoreProvider {
    StoreProvider::Memory
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_operation_timeout() -> u64 {
    5000
}

fn default_create_strategy() -> CreateStrategy {
    CreateStrategy::ClientId
}

fn default_backfill_attempts() -> u32 {
    3
}

fn default_initial_backoff() -> u64 {
    50
}

fn default_max_backoff() -> u64 {
    1000
}

fn default_order_field() -> String {
    "createdAt".to_string()
}

fn default_created_at_field() -> String {
    "createdAt".to_string()
}
