//! Application state shared across handlers.

use std::sync::Arc;

use bookshelf_core::{SchemaValidator, Validator};
use bookshelf_store::Store;

use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Database store.
    store: Arc<Store>,
    /// Server configuration.
    config: Arc<ServerConfig>,
    /// Request body validator.
    validator: Arc<dyn Validator>,
}

impl AppState {
    /// Create new application state with the default schema validator.
    pub fn new(store: Store, config: ServerConfig) -> Self {
        Self::with_validator(store, config, Arc::new(SchemaValidator))
    }

    /// Create new application state with a custom validator.
    pub fn with_validator(
        store: Store,
        config: ServerConfig,
        validator: Arc<dyn Validator>,
    ) -> Self {
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
            validator,
        }
    }

    /// Get a reference to the database store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get a reference to the request body validator.
    pub fn validator(&self) -> &dyn Validator {
        self.validator.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
