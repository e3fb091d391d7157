//! Proxy-rotating transcript fetch
//!
//! One call walks an explicit state machine:
//!
//! ```text
//! Start -> TryProxy(1) -> Success
//!                      -> NextProxy -> TryProxy(2) -> ...
//!                      -> FallbackDirect -> Done
//! ```
//!
//! Proxy attempts are strictly sequential and never reuse an address within
//! the same call. Errors from proxied attempts are absorbed; only the result
//! of the final direct attempt reaches the caller.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, instrument, warn};

use super::TranscriptService;
use crate::config::{RotationConfig, TranscriptConfig};
use crate::error::{Result, ScribeError};
use crate::models::{ProxyCandidate, TranscriptSegment};
use crate::proxy::directory::ProxyDirectory;
use crate::proxy::rotation::ProxySelector;
use crate::proxy::stats::ProxyStatsRegistry;

/// Tunables for the fetch loop
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Candidates requested from the directory per call
    pub max_candidates: usize,
    /// Upper bound on proxied attempts per call
    pub max_attempts: usize,
    /// Pause after a failed proxied attempt
    pub retry_delay: Duration,
    /// Transcript languages in priority order
    pub languages: Vec<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_candidates: 5,
            max_attempts: 3,
            retry_delay: Duration::from_secs(1),
            languages: vec!["pl".to_string(), "en".to_string()],
        }
    }
}

impl FetcherConfig {
    pub fn from_config(rotation: &RotationConfig, transcript: &TranscriptConfig) -> Self {
        Self {
            max_candidates: rotation.max_candidates,
            max_attempts: rotation.max_attempts,
            retry_delay: Duration::from_millis(rotation.retry_delay_ms),
            languages: transcript.languages.clone(),
        }
    }
}

/// Which path produced the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRoute {
    Proxy(String),
    Direct,
}

/// Successful fetch result
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub segments: Vec<TranscriptSegment>,
    pub route: FetchRoute,
    /// Number of proxied attempts made, successful or not
    pub proxy_attempts: usize,
}

/// Proxies already used within one call
#[derive(Debug, Default)]
pub struct AttemptRecord {
    candidates: Vec<ProxyCandidate>,
    tried: HashSet<String>,
    max_attempts: usize,
}

impl AttemptRecord {
    pub fn new(candidates: Vec<ProxyCandidate>, attempt_limit: usize) -> Self {
        let max_attempts = attempt_limit.min(candidates.len());
        Self {
            candidates,
            tried: HashSet::new(),
            max_attempts,
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn attempts_made(&self) -> usize {
        self.tried.len()
    }

    /// Candidates not yet tried, in ranked order
    pub fn untried(&self) -> Vec<ProxyCandidate> {
        self.candidates
            .iter()
            .filter(|c| !self.tried.contains(&c.address))
            .cloned()
            .collect()
    }

    pub fn mark_tried(&mut self, address: &str) {
        self.tried.insert(address.to_string());
    }

    pub fn was_tried(&self, address: &str) -> bool {
        self.tried.contains(address)
    }
}

/// States of a single fetch call
#[derive(Debug)]
pub enum FetchState {
    Start,
    TryProxy { attempt: usize },
    NextProxy { attempt: usize },
    FallbackDirect,
    Done(Result<FetchOutcome>),
}

/// Fetch orchestrator shared by all requests
pub struct TranscriptFetcher {
    directory: Arc<ProxyDirectory>,
    selector: Arc<dyn ProxySelector>,
    stats: Arc<ProxyStatsRegistry>,
    service: Arc<dyn TranscriptService>,
    config: FetcherConfig,
}

impl TranscriptFetcher {
    pub fn new(
        directory: Arc<ProxyDirectory>,
        selector: Arc<dyn ProxySelector>,
        stats: Arc<ProxyStatsRegistry>,
        service: Arc<dyn TranscriptService>,
        config: FetcherConfig,
    ) -> Self {
        Self {
            directory,
            selector,
            stats,
            service,
            config,
        }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    pub fn strategy_name(&self) -> &'static str {
        self.selector.strategy_name()
    }

    /// Fetch a transcript, rotating through proxies before going direct
    #[instrument(skip(self))]
    pub async fn fetch(&self, video_id: &str) -> Result<FetchOutcome> {
        let mut record = AttemptRecord::default();
        let mut state = FetchState::Start;

        loop {
            state = match state {
                FetchState::Start => self.start(&mut record).await,
                FetchState::TryProxy { attempt } => {
                    self.try_proxy(video_id, attempt, &mut record).await
                }
                FetchState::NextProxy { attempt } => self.next_proxy(attempt, &record).await,
                FetchState::FallbackDirect => self.fallback_direct(video_id, &record).await,
                FetchState::Done(result) => return result,
            };
        }
    }

    /// Load candidates once for this call
    pub async fn start(&self, record: &mut AttemptRecord) -> FetchState {
        let candidates = self
            .directory
            .fetch_candidates(self.config.max_candidates)
            .await;
        info!("Got {} proxies available", candidates.len());

        *record = AttemptRecord::new(candidates, self.config.max_attempts);
        if record.max_attempts() == 0 {
            FetchState::FallbackDirect
        } else {
            FetchState::TryProxy { attempt: 1 }
        }
    }

    /// One attempt through a freshly selected, untried proxy
    pub async fn try_proxy(
        &self,
        video_id: &str,
        attempt: usize,
        record: &mut AttemptRecord,
    ) -> FetchState {
        let available = record.untried();
        if available.is_empty() {
            warn!("No more unique proxies available");
            return FetchState::FallbackDirect;
        }

        let Some(proxy) = self.selector.select(&available) else {
            warn!("No proxy available for attempt {}", attempt);
            return FetchState::FallbackDirect;
        };
        record.mark_tried(&proxy.address);

        info!(
            "Attempt {}/{} using proxy: {}",
            attempt,
            record.max_attempts(),
            proxy.address
        );

        match self
            .service
            .fetch_transcript(video_id, &self.config.languages, Some(&proxy.endpoint))
            .await
        {
            Ok(segments) => {
                self.stats.record_outcome(&proxy.address, true);
                info!("Successfully retrieved transcript with proxy: {}", proxy.address);
                FetchState::Done(Ok(FetchOutcome {
                    segments,
                    route: FetchRoute::Proxy(proxy.address),
                    proxy_attempts: record.attempts_made(),
                }))
            }
            Err(e) => {
                self.stats.record_outcome(&proxy.address, false);
                warn!(
                    "Proxy attempt {} with {} failed: {}",
                    attempt, proxy.address, e
                );
                FetchState::NextProxy { attempt }
            }
        }
    }

    /// Pause after a failure, then try again or give up on proxies
    pub async fn next_proxy(&self, attempt: usize, record: &AttemptRecord) -> FetchState {
        if !self.config.retry_delay.is_zero() {
            tokio::time::sleep(self.config.retry_delay).await;
        }

        if attempt >= record.max_attempts() {
            FetchState::FallbackDirect
        } else {
            FetchState::TryProxy {
                attempt: attempt + 1,
            }
        }
    }

    /// Final attempt without a proxy; its outcome is returned as-is
    pub async fn fallback_direct(&self, video_id: &str, record: &AttemptRecord) -> FetchState {
        info!("All proxy attempts failed or no proxies available, attempting without proxy");

        let result = match self
            .service
            .fetch_transcript(video_id, &self.config.languages, None)
            .await
        {
            Ok(segments) => {
                info!("Successfully retrieved transcript without proxy");
                Ok(FetchOutcome {
                    segments,
                    route: FetchRoute::Direct,
                    proxy_attempts: record.attempts_made(),
                })
            }
            Err(e) => {
                error!("Failed to get transcript: {}", e);
                Err(ScribeError::FetchFailed {
                    video_id: video_id.to_string(),
                    reason: e.to_string(),
                })
            }
        };

        FetchState::Done(result)
    }
}
