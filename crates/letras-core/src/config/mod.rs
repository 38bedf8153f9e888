//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod database;
pub mod logging;
pub mod pagination;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::database::{BackfillConfig, CreateStrategy, DatabaseConfig, StoreProvider};
pub use self::logging::LoggingConfig;
pub use self::pagination::PaginationConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Document store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// List endpoint paging settings.
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `LETRAS__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("LETRAS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings the rest of the application cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.pagination.default_limit == 0 {
            return Err(AppError::configuration(
                "pagination.default_limit must be at least 1",
            ));
        }
        if self.pagination.max_limit < self.pagination.default_limit {
            return Err(AppError::configuration(
                "pagination.max_limit must not be lower than pagination.default_limit",
            ));
        }
        if self.database.provider == StoreProvider::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required for the postgres provider",
            ));
        }
        if self.database.order_field.trim().is_empty() {
            return Err(AppError::configuration("database.order_field must not be empty"));
        }
        if self.database.backfill.max_attempts == 0 {
            return Err(AppError::configuration(
                "database.backfill.max_attempts must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pagination.default_limit, 12);
        assert_eq!(config.database.provider, StoreProvider::Memory);
        assert_eq!(config.database.create_strategy, CreateStrategy::ClientId);
    }

    #[test]
    fn test_postgres_requires_url() {
        let mut config = AppConfig::default();
        config.database.provider = StoreProvider::Postgres;
        assert!(config.validate().is_err());

        config.database.url = "postgres://letras@localhost/letras".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_default_limit_rejected() {
        let mut config = AppConfig::default();
        config.pagination.default_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let raw = r#"
            [server]
            port = 9000

            [database]
            create_strategy = "two_phase"
            operation_timeout_ms = 250
        "#;
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("config should parse");

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.create_strategy, CreateStrategy::TwoPhase);
        assert_eq!(config.database.operation_timeout_ms, 250);
        assert_eq!(config.database.order_field, "createdAt");
        assert_eq!(config.logging.level, "info");
    }
}
