//! API route definitions

use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use super::server::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/status", get(handlers::health::status))
        .route(
            "/get_transcript",
            post(handlers::transcript::get_transcript),
        )
        .route("/api/proxy-stats", get(handlers::stats::list_proxy_stats))
        .with_state(state)
}
