//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use letras_core::config::AppConfig;
use letras_core::traits::DocumentStore;
use letras_database::CollectionRepository;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Repository every collection is served through
    pub repository: Arc<CollectionRepository>,
}

impl AppState {
    /// Build the state over an already connected store.
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        let repository = CollectionRepository::new(store, &config.database);
        Self {
            config: Arc::new(config),
            repository: Arc::new(repository),
        }
    }
}
