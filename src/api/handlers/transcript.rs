//! Transcript endpoint

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::info;

use crate::api::server::AppState;
use crate::error::ScribeError;
use crate::models::{format_transcript, TranscriptRequest, TranscriptResponse};
use crate::transcript::extract_video_id;

/// Fetch and format the transcript of the video referenced by `url`
pub async fn get_transcript(
    State(state): State<AppState>,
    payload: Result<Json<TranscriptRequest>, JsonRejection>,
) -> Result<Json<TranscriptResponse>, ScribeError> {
    let Json(req) = payload.map_err(|e| ScribeError::InvalidRequest(e.body_text()))?;

    let url = req
        .url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ScribeError::InvalidRequest("URL is required".to_string()))?;

    let video_id = extract_video_id(&url)?;
    info!(video_id = %video_id, "Processing video");

    let outcome = state.fetcher.fetch(&video_id).await?;
    info!(
        video_id = %video_id,
        route = ?outcome.route,
        segments = outcome.segments.len(),
        "Transcript served"
    );

    Ok(Json(TranscriptResponse {
        transcript: format_transcript(&outcome.segments),
        video_id,
    }))
}
