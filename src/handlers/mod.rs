pub mod response;
pub mod router;
pub mod upload;

pub use response::{ApiRequest, ApiResponse};
pub use router::route;

use crate::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse};

/// Actix entry point for every request. Registered as the app's default
/// service so that routing, including OPTIONS on arbitrary paths, is decided
/// by [`route`] alone.
pub async fn dispatch(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> HttpResponse {
    let request = ApiRequest::new(req.method().as_str(), req.path(), body);
    route(&state, &request).await.into()
}
