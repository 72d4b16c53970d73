use axum::{extract::State, Json};
use tracing::info;

use crate::{
    error::ApiError,
    models::{CommuteRequest, CommuteResponse},
    state::AppState,
};

/// One-off aggregation over a posted marker list, independent of the session
pub async fn post_commute(
    State(state): State<AppState>,
    Json(request): Json<CommuteRequest>,
) -> Result<Json<CommuteResponse>, ApiError> {
    if let Some(index) = request
        .markers
        .iter()
        .position(|marker| !marker.position.is_valid())
    {
        return Err(ApiError::BadRequest(format!(
            "Marker {} has invalid coordinates",
            index
        )));
    }

    let results = state.aggregator.aggregate(&request.markers).await;

    info!(
        "Computed {} commute results ({} partial)",
        results.len(),
        results.iter().filter(|result| result.is_partial()).count()
    );

    Ok(Json(CommuteResponse { results }))
}
