//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::services::StoreEnvironment;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for store operations
    pub repository: Arc<dyn FullRepository>,
    /// Connection settings presence, reported by diagnostics
    pub store_env: StoreEnvironment,
}

impl AppState {
    /// Create a new application state, reading connection settings from the
    /// environment.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self::with_store_environment(repository, StoreEnvironment::from_env())
    }

    pub fn with_store_environment(
        repository: Arc<dyn FullRepository>,
        store_env: StoreEnvironment,
    ) -> Self {
        Self {
            repository,
            store_env,
        }
    }
}
