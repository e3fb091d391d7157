//! Health check endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::api::server::AppState;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rotascribe"
        })),
    )
}

/// Runtime status: uptime, rotation strategy and tracked proxy count
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "running",
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "rotation_strategy": state.fetcher.strategy_name(),
        "tracked_proxies": state.stats.len(),
    }))
}
