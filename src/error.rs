//! # Error Handling
//!
//! Typed failures of the upload flow and how they map to HTTP status codes.
//!
//! Every step of the upload returns `Result<_, UploadError>`. The router is the
//! only place that turns an error into a response, so the status-code policy
//! lives in [`UploadError::status_code`] and nowhere else.
//!
//! ## Status Code Mapping:
//! By default every upload failure answers 400, which is what existing clients
//! of this endpoint are written against. Bad input and store outages are
//! indistinguishable by status; only the message differs.
//!
//! With `errors.typed_status_codes` enabled:
//! - Validation/Decode → 400 (the client sent something unusable)
//! - Storage/Metadata → 500 (a backing store failed)

use actix_web::http::StatusCode;
use std::fmt;

/// Failure of one step of the upload flow.
///
/// Each variant carries the human-readable detail that ends up in the
/// `"Error processing request: <details>"` response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Body is not JSON, is not an object, or lacks `patientId`/`audioBase64`
    Validation(String),

    /// `audioBase64` is not valid base64
    Decode(String),

    /// Object-store write failed
    Storage(String),

    /// Metadata-store write failed (the object may already be stored)
    Metadata(String),
}

impl UploadError {
    /// Short machine-oriented name, used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            UploadError::Validation(_) => "validation_error",
            UploadError::Decode(_) => "decode_error",
            UploadError::Storage(_) => "storage_error",
            UploadError::Metadata(_) => "metadata_error",
        }
    }

    /// HTTP status for this error.
    ///
    /// Without `typed`, everything is 400. With it, store failures become 500.
    pub fn status_code(&self, typed: bool) -> StatusCode {
        if !typed {
            return StatusCode::BAD_REQUEST;
        }

        match self {
            UploadError::Validation(_) | UploadError::Decode(_) => StatusCode::BAD_REQUEST,
            UploadError::Storage(_) | UploadError::Metadata(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Validation(msg) => write!(f, "{}", msg),
            UploadError::Decode(msg) => write!(f, "invalid base64 audio: {}", msg),
            UploadError::Storage(msg) => write!(f, "object store write failed: {}", msg),
            UploadError::Metadata(msg) => write!(f, "metadata store write failed: {}", msg),
        }
    }
}

impl std::error::Error for UploadError {}

/// Body parse failures (syntax, wrong types, missing required fields) are all
/// validation errors. serde's message names the offending field.
impl From<serde_json::Error> for UploadError {
    fn from(err: serde_json::Error) -> Self {
        UploadError::Validation(err.to_string())
    }
}

impl From<base64::DecodeError> for UploadError {
    fn from(err: base64::DecodeError) -> Self {
        UploadError::Decode(err.to_string())
    }
}

/// Shorthand for results of the upload flow.
pub type UploadResult<T> = Result<T, UploadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_bad_request() {
        let validation = UploadError::Validation("missing field `patientId`".to_string());
        let decode = UploadError::Decode("Invalid byte 45, offset 3.".to_string());

        assert_eq!(validation.status_code(true), StatusCode::BAD_REQUEST);
        assert_eq!(decode.status_code(true), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_typed_mode_maps_store_errors_to_server_errors() {
        let storage = UploadError::Storage("disk full".to_string());
        let metadata = UploadError::Metadata("table offline".to_string());

        assert_eq!(storage.status_code(true), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(metadata.status_code(true), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_default_mode_answers_bad_request_for_everything() {
        for err in [
            UploadError::Validation("v".to_string()),
            UploadError::Decode("d".to_string()),
            UploadError::Storage("s".to_string()),
            UploadError::Metadata("m".to_string()),
        ] {
            assert_eq!(err.status_code(false), StatusCode::BAD_REQUEST, "{}", err.kind());
        }
    }

    #[test]
    fn test_serde_error_converts_to_validation() {
        let err: UploadError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, UploadError::Validation(_)));
    }

    #[test]
    fn test_display_includes_detail() {
        let err = UploadError::Storage("permission denied".to_string());
        assert_eq!(err.to_string(), "object store write failed: permission denied");
    }
}
