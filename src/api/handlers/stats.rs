//! Proxy statistics endpoint

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::api::server::AppState;

/// Current per-proxy statistics, sorted by address
pub async fn list_proxy_stats(State(state): State<AppState>) -> impl IntoResponse {
    let proxies = state.stats.snapshot_all();
    Json(json!({
        "count": proxies.len(),
        "proxies": proxies,
    }))
}
