use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// Reject cross-site callers whose `Origin` isn't the allowed site.
///
/// Requests without an `Origin` header come from servers, not browsers, and pass through.
pub async fn origin_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        if origin.as_bytes() != state.config.allowed_origin.as_bytes() {
            let origin = String::from_utf8_lossy(origin.as_bytes()).into_owned();
            warn!("Rejected request from origin {}", origin);
            return ApiError::Forbidden(format!("Origin {} is not allowed", origin)).into_response();
        }
    }

    next.run(request).await
}
