//! Transcript retrieval
//!
//! - Video ID extraction from user-supplied URLs
//! - The outbound transcript service (YouTube captions)
//! - The proxy-rotating fetch orchestration

pub mod fetcher;
pub mod video_id;
pub mod youtube;

pub use fetcher::{FetchOutcome, FetchRoute, FetcherConfig, TranscriptFetcher};
pub use video_id::extract_video_id;
pub use youtube::YouTubeTranscriptClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ProxyEndpoint, TranscriptSegment};

/// Outbound transcript service
#[async_trait]
pub trait TranscriptService: Send + Sync {
    /// Fetch the transcript of `video_id` in the first available language of
    /// `languages`, optionally routed through `proxy`
    async fn fetch_transcript(
        &self,
        video_id: &str,
        languages: &[String],
        proxy: Option<&ProxyEndpoint>,
    ) -> Result<Vec<TranscriptSegment>>;
}
