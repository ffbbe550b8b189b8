//! # Object and Metadata Stores
//!
//! The upload flow only ever needs a single `put` against each store, so the
//! traits are deliberately that small. Implementations are selected at startup
//! from `storage.backend` and injected into [`AppState`](crate::state::AppState)
//! behind `Arc<dyn …>`, which lets tests swap in fakes.

use crate::config::{StorageBackend, StorageConfig};
use crate::models::AudioRecord;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

pub mod local;
pub mod memory;

pub use local::{LocalMetadataStore, LocalObjectStore};
pub use memory::{InMemoryMetadataStore, InMemoryObjectStore};

/// Failure reported by a store backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError(pub String);

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError(format!("record serialization failed: {}", err))
    }
}

/// Binary blob storage addressed by bucket + key.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`, replacing anything already there.
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;
}

/// Record storage keyed by `audioId`.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn put(&self, table: &str, record: &AudioRecord) -> Result<(), StoreError>;
}

/// Construct the configured store pair.
pub fn build_stores(config: &StorageConfig) -> (Arc<dyn ObjectStore>, Arc<dyn MetadataStore>) {
    match config.backend {
        StorageBackend::Local => (
            Arc::new(LocalObjectStore::new(config.root_dir.join("objects"))),
            Arc::new(LocalMetadataStore::new(config.root_dir.join("records"))),
        ),
        StorageBackend::Memory => {
            warn!("Using in-memory stores: uploads are lost on restart and memory use grows without bound");
            (
                Arc::new(InMemoryObjectStore::new()),
                Arc::new(InMemoryMetadataStore::new()),
            )
        }
    }
}

/// Reject names that could escape the store root when joined onto a path:
/// absolute paths and empty, `.` or `..` segments.
pub(crate) fn check_relative_key(kind: &str, key: &str) -> Result<(), StoreError> {
    if key.is_empty() || key.starts_with('/') || key.starts_with('\\') {
        return Err(StoreError(format!("invalid {} `{}`", kind, key)));
    }

    let bad_segment = key
        .split(['/', '\\'])
        .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if bad_segment {
        return Err(StoreError(format!("invalid {} `{}`", kind, key)));
    }

    Ok(())
}
