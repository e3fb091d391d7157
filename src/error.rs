use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message shown to clients for any server-side failure. The actual cause is only logged.
pub const GENERIC_FAILURE_MESSAGE: &str = "Could not retrieve transcript";

/// Message shown to clients when no video ID can be found in the URL
pub const INVALID_URL_MESSAGE: &str = "Invalid YouTube URL";

/// Unified error type for the Rotascribe service
#[derive(Error, Debug)]
pub enum ScribeError {
    // Input errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid YouTube URL: {0}")]
    InvalidVideoUrl(String),

    // Proxy provider errors
    #[error("Proxy provider token is not configured")]
    MissingProviderToken,

    #[error("Proxy provider rejected the API token")]
    ProviderUnauthorized,

    #[error("Proxy provider rate limit exceeded")]
    ProviderRateLimited,

    #[error("Proxy provider returned status {0}")]
    ProviderStatus(u16),

    #[error("Invalid proxy entry: {0}")]
    InvalidProxyEntry(String),

    // Transcript service errors
    #[error("Request was blocked by YouTube")]
    RequestBlocked,

    #[error("Transcripts are disabled for video {video_id}")]
    TranscriptsDisabled { video_id: String },

    #[error("No transcript found for video {video_id} in languages {languages:?}")]
    NoTranscriptFound {
        video_id: String,
        languages: Vec<String>,
    },

    #[error("Upstream returned status {0}")]
    UpstreamStatus(u16),

    #[error("Failed to fetch transcript for {video_id}: {reason}")]
    FetchFailed { video_id: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Transport/decoding errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Rotascribe operations
pub type Result<T> = std::result::Result<T, ScribeError>;

impl ScribeError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            ScribeError::InvalidRequest(_) | ScribeError::InvalidVideoUrl(_) => {
                StatusCode::BAD_REQUEST
            }

            // Everything else is an upstream or internal failure from the client's view
            ScribeError::MissingProviderToken
            | ScribeError::ProviderUnauthorized
            | ScribeError::ProviderRateLimited
            | ScribeError::ProviderStatus(_)
            | ScribeError::InvalidProxyEntry(_)
            | ScribeError::RequestBlocked
            | ScribeError::TranscriptsDisabled { .. }
            | ScribeError::NoTranscriptFound { .. }
            | ScribeError::UpstreamStatus(_)
            | ScribeError::FetchFailed { .. }
            | ScribeError::InvalidConfig(_)
            | ScribeError::Http(_)
            | ScribeError::Json(_)
            | ScribeError::Io(_)
            | ScribeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Message safe to return to the client
    pub fn public_message(&self) -> String {
        match self {
            ScribeError::InvalidRequest(msg) => msg.clone(),
            ScribeError::InvalidVideoUrl(_) => INVALID_URL_MESSAGE.to_string(),
            _ if self.is_client_error() => self.to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for ScribeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Invalid input: {}", self);
        }

        let body = json!({
            "error": self.public_message(),
        });

        (status, Json(body)).into_response()
    }
}

impl From<url::ParseError> for ScribeError {
    fn from(err: url::ParseError) -> Self {
        ScribeError::InvalidProxyEntry(err.to_string())
    }
}
