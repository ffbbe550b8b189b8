//! # Audio Upload Flow
//!
//! `POST /upload` in order:
//! 1. parse the JSON body into an [`UploadRequest`]
//! 2. decode `audioBase64`
//! 3. mint a fresh `audioId` and UTC timestamp
//! 4. write the audio to the object store under `{patientId}/{audioType}/{audioId}.wav`
//! 5. write the [`AudioRecord`] to the metadata store
//!
//! The two writes are not transactional. If step 5 fails the object from
//! step 4 stays in the bucket without a record pointing at it. If step 4 fails,
//! step 5 never runs.

use crate::error::{UploadError, UploadResult};
use crate::models::{AudioRecord, UploadRequest};
use crate::state::AppState;
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "Audio file uploaded and metadata saved successfully.";

/// Run the upload flow for one request body and return the stored record.
pub async fn process_upload(state: &AppState, body: &[u8]) -> UploadResult<AudioRecord> {
    let request = UploadRequest::from_body(body)?;
    let audio_bytes = decode_audio(&request.audio_base64)?;

    let audio_id = Uuid::new_v4();
    let record = AudioRecord::new(request, audio_id, Utc::now());
    let size = audio_bytes.len();
    let key = record.storage_key();
    debug_assert_eq!(key, record.storage_path);

    debug!(audio_id = %audio_id, key = %key, size, "Writing audio object");
    state
        .objects
        .put(state.bucket(), &key, audio_bytes)
        .await
        .map_err(|e| UploadError::Storage(e.to_string()))?;

    state
        .records
        .put(state.table(), &record)
        .await
        .map_err(|e| UploadError::Metadata(e.to_string()))?;

    info!(
        audio_id = %record.audio_id,
        audio_type = %record.audio_type,
        size,
        "Audio uploaded"
    );
    Ok(record)
}

/// Strict standard-alphabet base64 with padding.
pub fn decode_audio(encoded: &str) -> UploadResult<Vec<u8>> {
    Ok(general_purpose::STANDARD.decode(encoded)?)
}
