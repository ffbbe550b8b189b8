//! Filesystem-backed stores for development and single-host deployments.
//!
//! Layout under the configured root:
//! - objects: `{root}/objects/{bucket}/{key}`
//! - records: `{root}/records/{table}/{audioId}.json`

use super::{check_relative_key, MetadataStore, ObjectStore, StoreError};
use crate::models::AudioRecord;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

pub struct LocalObjectStore {
    base_path: PathBuf,
}

impl LocalObjectStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StoreError> {
        check_relative_key("bucket", bucket)?;
        check_relative_key("key", key)?;
        Ok(self.base_path.join(bucket).join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let full_path = self.object_path(bucket, key)?;
        write_file(&full_path, &bytes).await?;

        debug!(bucket = %bucket, key = %key, size = bytes.len(), "Object written");
        Ok(())
    }
}

pub struct LocalMetadataStore {
    base_path: PathBuf,
}

impl LocalMetadataStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn record_path(&self, table: &str, record: &AudioRecord) -> Result<PathBuf, StoreError> {
        check_relative_key("table", table)?;
        Ok(self
            .base_path
            .join(table)
            .join(format!("{}.json", record.audio_id)))
    }
}

#[async_trait]
impl MetadataStore for LocalMetadataStore {
    async fn put(&self, table: &str, record: &AudioRecord) -> Result<(), StoreError> {
        let full_path = self.record_path(table, record)?;
        let document = serde_json::to_vec_pretty(record)?;
        write_file(&full_path, &document).await?;

        debug!(table = %table, audio_id = %record.audio_id, "Record written");
        Ok(())
    }
}

/// Write `content` to a temporary sibling of `full_path`, then rename it into
/// place. Readers see either the old file or the complete new one.
async fn write_file(full_path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let parent = full_path
        .parent()
        .ok_or_else(|| StoreError(format!("no parent directory for {}", full_path.display())))?;
    let file_name = full_path
        .file_name()
        .ok_or_else(|| StoreError(format!("no file name in {}", full_path.display())))?;
    fs::create_dir_all(parent).await?;

    let temp_path = parent.join(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        Uuid::new_v4().simple()
    ));

    if let Err(err) = write_and_sync(&temp_path, content).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(err.into());
    }

    if let Err(err) = fs::rename(&temp_path, full_path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(err.into());
    }

    Ok(())
}

async fn write_and_sync(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(content).await?;
    file.sync_all().await
}
