use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    error::ApiError,
    libraries::MarkerSession,
    models::{AddMarkerRequest, SessionResponse},
    state::AppState,
};

fn session_response(session: &MarkerSession, state: &AppState) -> SessionResponse {
    let mut commute = state.commute_view.borrow().clone();
    // The recompute loop may not have picked up the latest change yet
    commute.loading = commute.loading || commute.generation != session.generation();

    SessionResponse {
        generation: session.generation(),
        markers: session.markers().to_vec(),
        selected: session.selected(),
        commute,
    }
}

pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let session = state.session.lock();
    Json(session_response(&session, &state))
}

pub async fn add_marker(
    State(state): State<AppState>,
    Json(request): Json<AddMarkerRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    if !request.position.is_valid() {
        return Err(ApiError::BadRequest(
            "Invalid coordinates provided.".to_string(),
        ));
    }

    let mut session = state.session.lock();
    let index = session.add_marker(request.position, request.address);
    info!(
        "Added marker {} at {}",
        index,
        session.markers()[index].position
    );

    Ok((StatusCode::CREATED, Json(session_response(&session, &state))))
}

pub async fn delete_marker(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<SessionResponse>, ApiError> {
    let mut session = state.session.lock();
    let removed = session.delete_marker(index)?;
    info!("Deleted marker {} ({})", index, removed.address);

    Ok(Json(session_response(&session, &state)))
}

pub async fn toggle_home(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<SessionResponse>, ApiError> {
    let mut session = state.session.lock();
    session.toggle_home(index)?;

    Ok(Json(session_response(&session, &state)))
}

pub async fn increment_visits(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<SessionResponse>, ApiError> {
    let mut session = state.session.lock();
    session.increment_visits(index)?;

    Ok(Json(session_response(&session, &state)))
}

pub async fn decrement_visits(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<SessionResponse>, ApiError> {
    let mut session = state.session.lock();
    session.decrement_visits(index)?;

    Ok(Json(session_response(&session, &state)))
}

pub async fn select_marker(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<SessionResponse>, ApiError> {
    let mut session = state.session.lock();
    session.select(index)?;

    Ok(Json(session_response(&session, &state)))
}

pub async fn clear_selection(State(state): State<AppState>) -> Json<SessionResponse> {
    let mut session = state.session.lock();
    session.clear_selection();

    Json(session_response(&session, &state))
}
