//! # Application State
//!
//! Shared state handed to every request. Unlike a typical web service there is
//! nothing to mutate here: configuration is fixed at startup and the store
//! handles are shared, thread-safe clients.
//!
//! ## Arc<dyn Trait>
//! - **Arc**: every actix worker holds a cheap clone of the same handles
//! - **dyn ObjectStore / dyn MetadataStore**: the concrete backend is picked at
//!   startup, and tests pass in-memory or failing stores instead

use crate::config::AppConfig;
use crate::storage::{build_stores, MetadataStore, ObjectStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub objects: Arc<dyn ObjectStore>,
    pub records: Arc<dyn MetadataStore>,
}

impl AppState {
    /// Create state with stores built from `config.storage`.
    pub fn new(config: AppConfig) -> Self {
        let (objects, records) = build_stores(&config.storage);
        Self::with_stores(config, objects, records)
    }

    /// Create state around explicitly supplied stores.
    pub fn with_stores(
        config: AppConfig,
        objects: Arc<dyn ObjectStore>,
        records: Arc<dyn MetadataStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            objects,
            records,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.config.storage.bucket
    }

    pub fn table(&self) -> &str {
        &self.config.storage.table
    }
}
