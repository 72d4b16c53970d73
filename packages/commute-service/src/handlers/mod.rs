pub mod commute;
pub mod relay;
pub mod session;

use axum::{response::IntoResponse, Json};

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "commute-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
