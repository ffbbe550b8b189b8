//! In-memory stores. Contents live only as long as the process and grow
//! without bound, so these are for tests and throwaway runs.
//!
//! The read-back helpers are test-only; the service itself never reads back.

use super::{MetadataStore, ObjectStore, StoreError};
use crate::models::AudioRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<(String, String), Vec<u8>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    #[cfg(test)]
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .read()
            .await
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, key)| key.clone())
            .collect()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), key.to_string()), bytes);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryMetadataStore {
    records: RwLock<HashMap<(String, Uuid), AudioRecord>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn get(&self, table: &str, audio_id: &Uuid) -> Option<AudioRecord> {
        self.records
            .read()
            .await
            .get(&(table.to_string(), *audio_id))
            .cloned()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    #[cfg(test)]
    pub async fn records(&self, table: &str) -> Vec<AudioRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|((t, _), _)| t == table)
            .map(|(_, record)| record.clone())
            .collect()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn put(&self, table: &str, record: &AudioRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert((table.to_string(), record.audio_id), record.clone());
        Ok(())
    }
}
