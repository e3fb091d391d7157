//! Uniform random proxy selection

use std::sync::Arc;

use tracing::debug;

use super::source::RandomSource;
use super::ProxySelector;
use crate::models::ProxyCandidate;

/// Selects a random proxy from the pool, ignoring statistics
pub struct RandomSelector {
    rng: Arc<dyn RandomSource>,
}

impl RandomSelector {
    pub fn new(rng: Arc<dyn RandomSource>) -> Self {
        Self { rng }
    }
}

impl ProxySelector for RandomSelector {
    fn select(&self, candidates: &[ProxyCandidate]) -> Option<ProxyCandidate> {
        if candidates.is_empty() {
            return None;
        }

        let picked = &candidates[self.rng.pick_index(candidates.len())];
        debug!(proxy = %picked.address, "Selected random proxy");
        Some(picked.clone())
    }

    fn strategy_name(&self) -> &'static str {
        "random"
    }
}
