//! Exploit/explore proxy selection
//!
//! Candidates are split into a "proven" bucket (at least one success) and an
//! "unproven" bucket. Most of the time the best proven proxy is reused; the
//! rest of the time an unproven one is sampled so new proxies collect stats.

use std::sync::Arc;

use tracing::info;

use super::source::RandomSource;
use super::ProxySelector;
use crate::models::ProxyCandidate;

/// Default probability of reusing the best proven proxy
pub const DEFAULT_EXPLOIT_PROBABILITY: f64 = 0.9;

pub struct WeightedSelector {
    exploit_probability: f64,
    rng: Arc<dyn RandomSource>,
}

impl WeightedSelector {
    pub fn new(rng: Arc<dyn RandomSource>) -> Self {
        Self::with_probability(DEFAULT_EXPLOIT_PROBABILITY, rng)
    }

    pub fn with_probability(exploit_probability: f64, rng: Arc<dyn RandomSource>) -> Self {
        Self {
            exploit_probability: exploit_probability.clamp(0.0, 1.0),
            rng,
        }
    }
}

impl ProxySelector for WeightedSelector {
    fn select(&self, candidates: &[ProxyCandidate]) -> Option<ProxyCandidate> {
        if candidates.is_empty() {
            return None;
        }

        let (proven, unproven): (Vec<&ProxyCandidate>, Vec<&ProxyCandidate>) =
            candidates.iter().partition(|c| c.is_proven());

        // Input is ranked, so the first proven candidate is the best one.
        if let Some(best) = proven.first() {
            if self.rng.next_f64() < self.exploit_probability {
                log_choice("best", best);
                return Some((*best).clone());
            }
        }

        if !unproven.is_empty() {
            let picked = unproven[self.rng.pick_index(unproven.len())];
            log_choice("untested", picked);
            return Some(picked.clone());
        }

        let picked = &candidates[self.rng.pick_index(candidates.len())];
        log_choice("fallback", picked);
        Some(picked.clone())
    }

    fn strategy_name(&self) -> &'static str {
        "weighted"
    }
}

fn log_choice(kind: &str, candidate: &ProxyCandidate) {
    info!(
        proxy = %candidate.address,
        "Selected {} proxy (success rate: {:.1}%, successful attempts: {})",
        kind,
        candidate.success_rate,
        candidate.success_count
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProxyEndpoint;
    use crate::proxy::rotation::SeededRandom;
    use crate::proxy::stats::ProxyStats;
    use chrono::Utc;
    use parking_lot::Mutex;

    /// Replays fixed draws
    struct ScriptedRandom {
        floats: Mutex<Vec<f64>>,
        indices: Mutex<Vec<usize>>,
    }

    impl ScriptedRandom {
        fn new(floats: Vec<f64>, indices: Vec<usize>) -> Arc<Self> {
            Arc::new(Self {
                floats: Mutex::new(floats),
                indices: Mutex::new(indices),
            })
        }
    }

    impl RandomSource for ScriptedRandom {
        fn next_f64(&self) -> f64 {
            self.floats.lock().remove(0)
        }

        fn pick_index(&self, len: usize) -> usize {
            self.indices.lock().remove(0) % len
        }
    }

    fn proven(host: &str, successes: u64) -> ProxyCandidate {
        let stats = ProxyStats {
            success_count: successes,
            fail_count: 0,
            last_success_at: Some(Utc::now()),
            last_used_at: Some(Utc::now()),
        };
        ProxyCandidate::new(ProxyEndpoint::new(host, 8080, "u", "p").unwrap(), &stats)
    }

    fn unproven(host: &str) -> ProxyCandidate {
        ProxyCandidate::new(
            ProxyEndpoint::new(host, 8080, "u", "p").unwrap(),
            &ProxyStats::default(),
        )
    }

    #[test]
    fn test_empty_pool_selects_nothing() {
        let selector = WeightedSelector::new(ScriptedRandom::new(vec![], vec![]));
        assert!(selector.select(&[]).is_none());
    }

    #[test]
    fn test_exploit_branch_takes_best_proven() {
        let selector = WeightedSelector::new(ScriptedRandom::new(vec![0.5], vec![]));
        let pool = vec![proven("best", 5), proven("second", 2), unproven("new")];

        let picked = selector.select(&pool).unwrap();
        assert_eq!(picked.endpoint.host, "best");
    }

    #[test]
    fn test_explore_branch_takes_unproven() {
        let selector = WeightedSelector::new(ScriptedRandom::new(vec![0.95], vec![1]));
        let pool = vec![proven("best", 5), unproven("new-a"), unproven("new-b")];

        let picked = selector.select(&pool).unwrap();
        assert_eq!(picked.endpoint.host, "new-b");
    }

    #[test]
    fn test_explore_without_unproven_falls_back_to_full_pool() {
        let selector = WeightedSelector::new(ScriptedRandom::new(vec![0.95], vec![1]));
        let pool = vec![proven("best", 5), proven("second", 2)];

        let picked = selector.select(&pool).unwrap();
        assert_eq!(picked.endpoint.host, "second");
    }

    #[test]
    fn test_no_proven_skips_exploit_draw() {
        // No float is scripted: drawing one would panic.
        let selector = WeightedSelector::new(ScriptedRandom::new(vec![], vec![0]));
        let pool = vec![unproven("new-a"), unproven("new-b")];

        let picked = selector.select(&pool).unwrap();
        assert_eq!(picked.endpoint.host, "new-a");
    }

    #[test]
    fn test_failed_only_proxies_are_unproven() {
        let stats = ProxyStats {
            success_count: 0,
            fail_count: 3,
            last_success_at: None,
            last_used_at: Some(Utc::now()),
        };
        let failed =
            ProxyCandidate::new(ProxyEndpoint::new("bad", 8080, "u", "p").unwrap(), &stats);
        assert!(!failed.is_proven());

        let selector = WeightedSelector::new(ScriptedRandom::new(vec![], vec![0]));
        let picked = selector.select(&[failed]).unwrap();
        assert_eq!(picked.endpoint.host, "bad");
    }

    #[test]
    fn test_best_proven_chosen_about_ninety_percent() {
        let selector = WeightedSelector::new(Arc::new(SeededRandom::new(42)));
        let pool = vec![proven("best", 5), proven("second", 1), unproven("new")];

        let draws = 10_000;
        let best = (0..draws)
            .filter(|_| selector.select(&pool).unwrap().endpoint.host == "best")
            .count();

        let share = best as f64 / draws as f64;
        assert!((0.87..=0.93).contains(&share), "best share was {}", share);
    }

    #[test]
    fn test_probability_is_clamped() {
        let selector = WeightedSelector::with_probability(
            1.5,
            ScriptedRandom::new(vec![0.999], vec![]),
        );
        let pool = vec![proven("best", 1), unproven("new")];
        assert_eq!(selector.select(&pool).unwrap().endpoint.host, "best");
    }
}
