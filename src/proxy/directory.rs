//! Candidate proxy directory
//!
//! Lists proxies from the provider, attaches a statistics snapshot to each
//! and orders them by historical reliability.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use super::provider::ProxyProvider;
use super::stats::ProxyStatsRegistry;
use crate::error::ScribeError;
use crate::models::ProxyCandidate;

pub struct ProxyDirectory {
    provider: Arc<dyn ProxyProvider>,
    stats: Arc<ProxyStatsRegistry>,
}

impl ProxyDirectory {
    pub fn new(provider: Arc<dyn ProxyProvider>, stats: Arc<ProxyStatsRegistry>) -> Self {
        Self { provider, stats }
    }

    /// Fetch up to `limit` ranked candidates.
    ///
    /// Provider failures are logged and yield an empty list; callers treat
    /// that as "no proxies, go direct".
    #[instrument(skip(self), fields(provider = self.provider.provider_name()))]
    pub async fn fetch_candidates(&self, limit: usize) -> Vec<ProxyCandidate> {
        let entries = match self.provider.list_proxies(limit).await {
            Ok(entries) => entries,
            Err(e) => {
                log_provider_error(&e);
                return Vec::new();
            }
        };

        let mut candidates: Vec<ProxyCandidate> = entries
            .into_iter()
            .filter_map(|entry| match entry.into_endpoint() {
                Ok(endpoint) => Some(endpoint),
                Err(e) => {
                    debug!("Dropping proxy entry: {}", e);
                    None
                }
            })
            .map(|endpoint| {
                let stats = self.stats.get(&endpoint.address());
                let candidate = ProxyCandidate::new(endpoint, &stats);
                info!(
                    proxy = %candidate.address,
                    "Proxy success rate: {:.1}%, last success: {}",
                    candidate.success_rate,
                    candidate
                        .last_success_at
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| "never".to_string())
                );
                candidate
            })
            .collect();

        rank_candidates(&mut candidates);
        candidates.truncate(limit);

        info!("Retrieved {} valid proxies", candidates.len());
        candidates
    }
}

/// Sort by success rate, then success count, then most recent success.
///
/// Candidates that have succeeded at least once sort ahead of those that
/// never have. The sort is stable, so equal keys keep provider order.
pub fn rank_candidates(candidates: &mut [ProxyCandidate]) {
    candidates.sort_by(compare_reliability);
}

fn compare_reliability(a: &ProxyCandidate, b: &ProxyCandidate) -> Ordering {
    b.success_rate
        .partial_cmp(&a.success_rate)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.success_count.cmp(&a.success_count))
        .then_with(|| match (a.last_success_at, b.last_success_at) {
            (Some(a_at), Some(b_at)) => b_at.cmp(&a_at),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

fn log_provider_error(err: &ScribeError) {
    match err {
        ScribeError::MissingProviderToken => {
            error!("Proxy provider token not found in configuration")
        }
        ScribeError::ProviderRateLimited => error!("Proxy provider rate limit exceeded"),
        ScribeError::ProviderUnauthorized => error!("Invalid proxy provider token"),
        ScribeError::ProviderStatus(status) => {
            error!("Failed to list proxies from provider: status {}", status)
        }
        other => error!("Error fetching proxies from provider: {}", other),
    }
}
