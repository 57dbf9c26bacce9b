//! Score-derived difficulty
//!
//! Pure functions only; the state machine owns score and best score and
//! calls these on every change.

use crate::consts::SCORE_PER_SPEED_STEP;

/// Motion multiplier for scrolling entities: `1 + score / 1000`
#[inline]
pub fn speed_factor(score: u64) -> f32 {
    1.0 + score as f32 / SCORE_PER_SPEED_STEP
}

/// Best score after observing `score`
#[inline]
pub fn record_best(best: u64, score: u64) -> u64 {
    best.max(score)
}

/// Chance that a spawn becomes a cluster instead of a single obstacle
#[inline]
pub fn cluster_probability(score: u64) -> f32 {
    (speed_factor(score) - 1.0).clamp(0.0, 1.0)
}

/// Chance that a cluster gets a third obstacle
#[inline]
pub fn triple_probability(score: u64) -> f32 {
    cluster_probability(score) / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_score_zero() {
        assert_eq!(speed_factor(0), 1.0);
        assert_eq!(cluster_probability(0), 0.0);
        assert_eq!(triple_probability(0), 0.0);
    }

    #[test]
    fn test_score_thousand() {
        assert!((speed_factor(1000) - 2.0).abs() < 1e-6);
        assert!((cluster_probability(1000) - 1.0).abs() < 1e-6);
        assert!((triple_probability(1000) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_cluster_probability_saturates() {
        assert_eq!(cluster_probability(5000), 1.0);
    }

    proptest! {
        #[test]
        fn speed_factor_is_linear(score in 0u64..1_000_000) {
            let expected = 1.0 + score as f64 / 1000.0;
            prop_assert!((speed_factor(score) as f64 - expected).abs() < expected * 1e-6);
        }

        #[test]
        fn best_never_below_either(best in any::<u64>(), score in any::<u64>()) {
            let next = record_best(best, score);
            prop_assert!(next >= best);
            prop_assert!(next >= score);
        }

        #[test]
        fn best_is_monotonic_over_a_run(scores in proptest::collection::vec(0u64..10_000, 1..50)) {
            let mut best = 0;
            for score in scores {
                let next = record_best(best, score);
                prop_assert!(next >= best);
                best = next;
            }
        }
    }
}
