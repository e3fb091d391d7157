//! Per-proxy success/failure statistics
//!
//! The registry lives for the whole process and is shared behind an `Arc`.
//! Entries are created lazily and never removed.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::info;

use crate::models::ProxyStatsView;

/// Counters for a single proxy address
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProxyStats {
    pub success_count: u64,
    pub fail_count: u64,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl ProxyStats {
    pub fn total_attempts(&self) -> u64 {
        self.success_count + self.fail_count
    }

    /// Percentage of successful attempts in `[0, 100]`, 0 when unused
    pub fn success_rate(&self) -> f64 {
        let total = self.total_attempts();
        if total == 0 {
            0.0
        } else {
            self.success_count as f64 / total as f64 * 100.0
        }
    }
}

/// Process-wide statistics keyed by `host:port`
#[derive(Debug, Default)]
pub struct ProxyStatsRegistry {
    entries: DashMap<String, ProxyStats>,
}

impl ProxyStatsRegistry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Record one attempt through `address` and return the updated counters.
    ///
    /// The update happens under the entry's shard lock so concurrent
    /// requests never lose increments.
    pub fn record_outcome(&self, address: &str, success: bool) -> ProxyStats {
        let now = Utc::now();
        let updated = {
            let mut stats = self.entries.entry(address.to_string()).or_default();
            if success {
                stats.success_count += 1;
                stats.last_success_at = Some(now);
            } else {
                stats.fail_count += 1;
            }
            stats.last_used_at = Some(now);
            stats.clone()
        };

        info!(
            proxy = %address,
            "Proxy stats - success rate: {:.1}% (success: {}, fail: {})",
            updated.success_rate(),
            updated.success_count,
            updated.fail_count
        );

        updated
    }

    /// Current counters for `address`; zero-valued if never seen
    pub fn get(&self, address: &str) -> ProxyStats {
        self.entries
            .get(address)
            .map(|s| s.value().clone())
            .unwrap_or_default()
    }

    /// All entries, sorted by address
    pub fn snapshot_all(&self) -> Vec<ProxyStatsView> {
        let mut views: Vec<ProxyStatsView> = self
            .entries
            .iter()
            .map(|entry| ProxyStatsView::new(entry.key().clone(), entry.value()))
            .collect();
        views.sort_by(|a, b| a.address.cmp(&b.address));
        views
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
