//! # Upload Payload and Persisted Record
//!
//! `UploadRequest` is what clients POST to `/upload`; `AudioRecord` is what the
//! metadata store keeps for each successful upload. Field names on the wire are
//! camelCase to match the browser client.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub const DEFAULT_AUDIO_TYPE: &str = "unknown";
pub const DEFAULT_FILENAME: &str = "unknown.wav";

/// Body of `POST /upload`.
///
/// Optional fields are `Option` so an explicit JSON `null` falls back to the
/// default exactly like an absent field does.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub patient_id: String,
    #[serde(default)]
    pub audio_type: Option<String>,
    pub audio_base64: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl UploadRequest {
    /// Parse a raw request body. An empty body is treated as `{}`.
    pub fn from_body(body: &[u8]) -> serde_json::Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return serde_json::from_slice(b"{}");
        }
        serde_json::from_slice(body)
    }

    pub fn audio_type(&self) -> &str {
        self.audio_type.as_deref().unwrap_or(DEFAULT_AUDIO_TYPE)
    }

    pub fn filename(&self) -> &str {
        self.filename.as_deref().unwrap_or(DEFAULT_FILENAME)
    }
}

/// Object-store key for an upload: `{patientId}/{audioType}/{audioId}.wav`.
pub fn storage_key(patient_id: &str, audio_type: &str, audio_id: &Uuid) -> String {
    format!("{}/{}/{}.wav", patient_id, audio_type, audio_id)
}

/// Metadata persisted once per successful upload. Never updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioRecord {
    pub patient_id: String,
    pub audio_id: Uuid,
    pub audio_type: String,
    /// RFC 3339, UTC, microsecond precision
    pub timestamp: String,
    pub storage_path: String,
    pub filename: String,
    pub metadata: Map<String, Value>,
}

impl AudioRecord {
    /// Build the record for a new upload, deriving `storage_path` from the
    /// record's own identifying fields.
    pub fn new(request: UploadRequest, audio_id: Uuid, created_at: DateTime<Utc>) -> Self {
        let audio_type = request.audio_type().to_string();
        let filename = request.filename().to_string();
        let storage_path = storage_key(&request.patient_id, &audio_type, &audio_id);

        Self {
            patient_id: request.patient_id,
            audio_id,
            audio_type,
            timestamp: created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            storage_path,
            filename,
            metadata: request.metadata.unwrap_or_default(),
        }
    }

    /// Recompute the object key from the record alone.
    pub fn storage_key(&self) -> String {
        storage_key(&self.patient_id, &self.audio_type, &self.audio_id)
    }
}
