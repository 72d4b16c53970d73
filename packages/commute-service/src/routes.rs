use axum::http::{header, Method};
use axum::routing::{delete, get, post};
use axum::{middleware, Router};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{commute, health, relay, session};
use crate::middleware::origin_guard;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let allowed_origin = state.config.allowed_origin.clone();
    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            origin.as_bytes() == allowed_origin.as_bytes()
        }))
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/api/health", get(health))
        .route("/api/session", get(session::get_session))
        .route("/api/markers", post(session::add_marker))
        .route("/api/markers/:index", delete(session::delete_marker))
        .route("/api/markers/:index/toggle-home", post(session::toggle_home))
        .route(
            "/api/markers/:index/visits/increment",
            post(session::increment_visits),
        )
        .route(
            "/api/markers/:index/visits/decrement",
            post(session::decrement_visits),
        )
        .route("/api/markers/:index/select", post(session::select_marker))
        .route("/api/selection", delete(session::clear_selection))
        .route("/api/commute", post(commute::post_commute))
        // Any other POST is a distance relay request
        .fallback_service(post(relay::relay).with_state(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer)
                .layer(middleware::from_fn_with_state(state.clone(), origin_guard)),
        )
        .with_state(state)
}
