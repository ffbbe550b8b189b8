use crate::config::CorsConfig;
use crate::handlers::ApiResponse;
use actix_web::http::StatusCode;

pub const STATUS_MESSAGE: &str = "Service is operational";

/// `GET /status`. Fixed answer; does not touch the stores.
pub fn status(cors: &CorsConfig) -> ApiResponse {
    ApiResponse::message(StatusCode::OK, STATUS_MESSAGE, cors)
}
