//! Request and response descriptors the router works with.
//!
//! The router never touches actix types directly: the adapter in
//! [`super::dispatch`] builds an [`ApiRequest`] from the incoming request and
//! turns the resulting [`ApiResponse`] back into an `HttpResponse`.

use crate::config::CorsConfig;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;

pub const ALLOWED_METHODS: &str = "GET,POST,OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type,Authorization";

/// Inbound request: method, path and raw body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Always uppercase
    pub method: String,
    pub path: String,
    pub body: Vec<u8>,
}

impl ApiRequest {
    pub fn new(method: &str, path: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            body: body.into(),
        }
    }
}

/// Outbound response: status, headers and a (possibly empty) body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ApiResponse {
    /// JSON `{"message": ...}` response carrying the standard CORS headers.
    pub fn message(status: StatusCode, message: impl Into<String>, cors: &CorsConfig) -> Self {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        headers.extend(cors_headers(cors));

        Self {
            status,
            headers,
            body: json!({ "message": message.into() }).to_string(),
        }
    }

    /// Answer to a CORS preflight: 200 with an empty body.
    pub fn preflight(cors: &CorsConfig) -> Self {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        headers.extend(cors_headers(cors));
        headers.push((
            "Access-Control-Allow-Methods".to_string(),
            ALLOWED_METHODS.to_string(),
        ));
        headers.push((
            "Access-Control-Allow-Headers".to_string(),
            ALLOWED_HEADERS.to_string(),
        ));

        Self {
            status: StatusCode::OK,
            headers,
            body: String::new(),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

fn cors_headers(cors: &CorsConfig) -> [(String, String); 2] {
    [
        (
            "Access-Control-Allow-Origin".to_string(),
            cors.allow_origin.clone(),
        ),
        (
            "Access-Control-Allow-Credentials".to_string(),
            "true".to_string(),
        ),
    ]
}

impl From<ApiResponse> for HttpResponse {
    fn from(response: ApiResponse) -> Self {
        let mut builder = HttpResponse::build(response.status);
        for (name, value) in &response.headers {
            builder.insert_header((name.as_str(), value.as_str()));
        }
        builder.body(response.body)
    }
}
