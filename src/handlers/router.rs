//! Method + path dispatch. First match wins:
//!
//! | Method  | Path      | Behavior                        |
//! |---------|-----------|---------------------------------|
//! | OPTIONS | any       | CORS preflight, empty 200       |
//! | GET     | /status   | fixed "operational" message     |
//! | POST    | /upload   | upload flow                     |
//! | *       | *         | 404                             |

use super::response::{ApiRequest, ApiResponse};
use super::upload::{process_upload, UPLOAD_SUCCESS_MESSAGE};
use crate::health;
use crate::state::AppState;
use actix_web::http::StatusCode;
use tracing::{error, warn};

pub const NOT_FOUND_MESSAGE: &str = "404 Not Found";

pub async fn route(state: &AppState, request: &ApiRequest) -> ApiResponse {
    let cors = &state.config.cors;

    match (request.method.as_str(), request.path.as_str()) {
        ("OPTIONS", _) => ApiResponse::preflight(cors),
        ("GET", "/status") => health::status(cors),
        ("POST", "/upload") => upload(state, request).await,
        _ => {
            warn!(method = %request.method, path = %request.path, "No route matched");
            ApiResponse::message(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE, cors)
        }
    }
}

async fn upload(state: &AppState, request: &ApiRequest) -> ApiResponse {
    let cors = &state.config.cors;

    match process_upload(state, &request.body).await {
        Ok(_) => ApiResponse::message(StatusCode::OK, UPLOAD_SUCCESS_MESSAGE, cors),
        Err(err) => {
            let status = err.status_code(state.config.errors.typed_status_codes);
            error!(kind = err.kind(), status = status.as_u16(), error = %err, "Upload failed");
            ApiResponse::message(status, format!("Error processing request: {}", err), cors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::AudioRecord;
    use crate::storage::{
        InMemoryMetadataStore, InMemoryObjectStore, MetadataStore, ObjectStore, StoreError,
    };
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Arc;

    struct UnavailableObjectStore;

    #[async_trait]
    impl ObjectStore for UnavailableObjectStore {
        async fn put(&self, _bucket: &str, _key: &str, _bytes: Vec<u8>) -> Result<(), StoreError> {
            Err(StoreError("connection refused".to_string()))
        }
    }

    struct UnavailableMetadataStore;

    #[async_trait]
    impl MetadataStore for UnavailableMetadataStore {
        async fn put(&self, _table: &str, _record: &AudioRecord) -> Result<(), StoreError> {
            Err(StoreError("throughput exceeded".to_string()))
        }
    }

    fn config(typed: bool) -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.bucket = "recordings".to_string();
        config.storage.table = "audio-records".to_string();
        config.errors.typed_status_codes = typed;
        config
    }

    fn memory_state() -> (AppState, Arc<InMemoryObjectStore>, Arc<InMemoryMetadataStore>) {
        let objects = Arc::new(InMemoryObjectStore::new());
        let records = Arc::new(InMemoryMetadataStore::new());
        let state = AppState::with_stores(config(false), objects.clone(), records.clone());
        (state, objects, records)
    }

    fn message(response: &ApiResponse) -> String {
        let body: Value = serde_json::from_str(&response.body).unwrap();
        body["message"].as_str().unwrap().to_string()
    }

    fn upload_request(body: Value) -> ApiRequest {
        ApiRequest::new("POST", "/upload", body.to_string())
    }

    #[tokio::test]
    async fn test_status_is_always_operational() {
        let (state, _, _) = memory_state();

        let response = route(&state, &ApiRequest::new("GET", "/status", "")).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, r#"{"message":"Service is operational"}"#);
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
    }

    #[tokio::test]
    async fn test_options_on_any_path_is_preflight() {
        let (state, _, _) = memory_state();

        for path in ["/upload", "/status", "/anything/else"] {
            let response = route(&state, &ApiRequest::new("OPTIONS", path, "")).await;

            assert_eq!(response.status, StatusCode::OK);
            assert!(response.body.is_empty());
            assert_eq!(response.header("Access-Control-Allow-Methods"), Some("GET,POST,OPTIONS"));
            assert_eq!(
                response.header("Access-Control-Allow-Headers"),
                Some("Content-Type,Authorization")
            );
            assert_eq!(response.header("Access-Control-Allow-Credentials"), Some("true"));
        }
    }

    #[tokio::test]
    async fn test_unrouted_requests_are_not_found() {
        let (state, _, _) = memory_state();

        for (method, path) in [("DELETE", "/upload"), ("GET", "/upload"), ("POST", "/status"), ("GET", "/")] {
            let response = route(&state, &ApiRequest::new(method, path, "")).await;

            assert_eq!(response.status, StatusCode::NOT_FOUND, "{} {}", method, path);
            assert_eq!(message(&response), "404 Not Found");
        }
    }

    #[tokio::test]
    async fn test_successful_upload() {
        let (state, objects, records) = memory_state();

        let response = route(
            &state,
            &upload_request(json!({
                "patientId": "patient-42",
                "audioType": "speech",
                "audioBase64": "AAECAwQ=",
                "metadata": {"language": "ar", "consent": true}
            })),
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(message(&response), "Audio file uploaded and metadata saved successfully.");

        let stored = records.records("audio-records").await;
        assert_eq!(stored.len(), 1);
        let record = &stored[0];
        assert_eq!(record.metadata["consent"], json!(true));
        assert_eq!(
            objects.get("recordings", &record.storage_key()).await,
            Some(vec![0, 1, 2, 3, 4])
        );
    }

    #[tokio::test]
    async fn test_missing_patient_id_is_bad_request() {
        let (state, _, records) = memory_state();

        let response = route(&state, &upload_request(json!({"audioBase64": "AAEC"}))).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        let text = message(&response);
        assert!(text.starts_with("Error processing request: "));
        assert!(text.contains("patientId"));
        assert_eq!(records.len().await, 0);
    }

    #[tokio::test]
    async fn test_missing_audio_is_bad_request() {
        let (state, _, _) = memory_state();

        let response = route(&state, &upload_request(json!({"patientId": "p-1"}))).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(message(&response).contains("audioBase64"));
    }

    #[tokio::test]
    async fn test_malformed_base64_is_bad_request() {
        let (state, objects, _) = memory_state();

        let response = route(
            &state,
            &upload_request(json!({"patientId": "p-1", "audioBase64": "not-base64!!"})),
        )
        .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(objects.len().await, 0);
    }

    #[tokio::test]
    async fn test_unparsable_body_is_bad_request() {
        let (state, _, _) = memory_state();

        let response = route(&state, &ApiRequest::new("POST", "/upload", "{\"patientId\":")).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(message(&response).starts_with("Error processing request: "));
    }

    #[tokio::test]
    async fn test_object_store_failure_skips_metadata() {
        let records = Arc::new(InMemoryMetadataStore::new());
        let state = AppState::with_stores(config(false), Arc::new(UnavailableObjectStore), records.clone());

        let response = route(
            &state,
            &upload_request(json!({"patientId": "p-1", "audioBase64": "AAEC"})),
        )
        .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            message(&response),
            "Error processing request: object store write failed: connection refused"
        );
        assert_eq!(records.len().await, 0);
    }

    /// A stock config (only the store names filled in) keeps answering 400.
    #[tokio::test]
    async fn test_default_config_reports_store_failure_as_bad_request() {
        let mut config = AppConfig::default();
        config.storage.bucket = "recordings".to_string();
        config.storage.table = "audio-records".to_string();
        let state = AppState::with_stores(
            config,
            Arc::new(UnavailableObjectStore),
            Arc::new(InMemoryMetadataStore::new()),
        );

        let response = route(
            &state,
            &upload_request(json!({"patientId": "p", "audioBase64": "AAEC"})),
        )
        .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_object_store_failure_with_typed_statuses_is_server_error() {
        let records = Arc::new(InMemoryMetadataStore::new());
        let state = AppState::with_stores(config(true), Arc::new(UnavailableObjectStore), records.clone());

        let response = route(
            &state,
            &upload_request(json!({"patientId": "p-1", "audioBase64": "AAEC"})),
        )
        .await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(message(&response).contains("connection refused"));
        assert_eq!(records.len().await, 0);
    }

    #[tokio::test]
    async fn test_metadata_failure_leaves_object_behind() {
        let objects = Arc::new(InMemoryObjectStore::new());
        let state = AppState::with_stores(config(false), objects.clone(), Arc::new(UnavailableMetadataStore));

        let response = route(
            &state,
            &upload_request(json!({"patientId": "p-1", "audioType": "breath", "audioBase64": "AAEC"})),
        )
        .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(message(&response).contains("throughput exceeded"));
        let keys = objects.keys("recordings").await;
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with("p-1/breath/"));
    }

    #[tokio::test]
    async fn test_metadata_failure_with_typed_statuses_is_server_error() {
        let objects = Arc::new(InMemoryObjectStore::new());
        let state = AppState::with_stores(config(true), objects.clone(), Arc::new(UnavailableMetadataStore));

        let response = route(
            &state,
            &upload_request(json!({"patientId": "p-1", "audioBase64": "AAEC"})),
        )
        .await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(objects.len().await, 1);
    }
}
