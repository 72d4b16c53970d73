use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use crate::{
    models::{ErrorResponse, RelayRequest},
    services::DistanceError,
    state::AppState,
};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Invalid coordinates provided.")]
    InvalidCoordinates,

    #[error("Distance provider request failed: {0}")]
    Upstream(#[from] DistanceError),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match &self {
            RelayError::InvalidBody(rejection) => rejection.status(),
            RelayError::InvalidCoordinates => StatusCode::BAD_REQUEST,
            RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Forward one origin/destination pair to the distance matrix API.
///
/// The upstream body is relayed as-is. Failures always produce a response
/// so callers never wait on a request that will not finish.
pub async fn relay(
    State(state): State<AppState>,
    body: Result<Json<RelayRequest>, JsonRejection>,
) -> Result<Json<Value>, RelayError> {
    let Json(request) = body?;
    debug!("Relaying distance request: origin={} dest={}", request.origin, request.dest);

    if !request.origin.is_valid() || !request.dest.is_valid() {
        return Err(RelayError::InvalidCoordinates);
    }

    match state
        .distance_client
        .fetch_raw(request.origin, request.dest)
        .await
    {
        Ok(body) => Ok(Json(body)),
        Err(e) => {
            error!("Distance relay failed: {}", e);
            Err(e.into())
        }
    }
}
