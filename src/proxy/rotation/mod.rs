//! Proxy rotation strategies
//!
//! A selector picks one proxy from an already-ranked candidate pool.

mod random;
mod source;
mod weighted;

pub use random::RandomSelector;
pub use source::{RandomSource, SeededRandom, ThreadRandom};
pub use weighted::{WeightedSelector, DEFAULT_EXPLOIT_PROBABILITY};

use std::sync::Arc;

use crate::models::ProxyCandidate;

/// Strategy types for proxy rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationStrategy {
    #[default]
    Weighted,
    Random,
}

impl RotationStrategy {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "random" | "uniform" => Self::Random,
            _ => Self::Weighted,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weighted => "weighted",
            Self::Random => "random",
        }
    }
}

/// Trait for proxy selection strategies
pub trait ProxySelector: Send + Sync {
    /// Pick one candidate; `None` only when `candidates` is empty
    fn select(&self, candidates: &[ProxyCandidate]) -> Option<ProxyCandidate>;

    /// Get the strategy name
    fn strategy_name(&self) -> &'static str;
}

/// Create a proxy selector based on the strategy type
pub fn create_selector(
    strategy: RotationStrategy,
    exploit_probability: f64,
    rng: Arc<dyn RandomSource>,
) -> Arc<dyn ProxySelector> {
    match strategy {
        RotationStrategy::Weighted => {
            Arc::new(WeightedSelector::with_probability(exploit_probability, rng))
        }
        RotationStrategy::Random => Arc::new(RandomSelector::new(rng)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_strategy_from_str() {
        assert_eq!(
            RotationStrategy::from_str("weighted"),
            RotationStrategy::Weighted
        );
        assert_eq!(RotationStrategy::from_str("RANDOM"), RotationStrategy::Random);
        assert_eq!(
            RotationStrategy::from_str("unknown"),
            RotationStrategy::Weighted
        );
    }

    #[test]
    fn test_rotation_strategy_as_str() {
        assert_eq!(RotationStrategy::Weighted.as_str(), "weighted");
        assert_eq!(RotationStrategy::Random.as_str(), "random");
    }

    #[test]
    fn test_create_selector_strategy_name() {
        let rng: Arc<dyn RandomSource> = Arc::new(ThreadRandom);
        assert_eq!(
            create_selector(RotationStrategy::Weighted, 0.9, rng.clone()).strategy_name(),
            "weighted"
        );
        assert_eq!(
            create_selector(RotationStrategy::Random, 0.9, rng).strategy_name(),
            "random"
        );
    }
}
