//! Cost accounting for scoring calls.
//!
//! Pricing is tiered per million tokens, keyed by whether a call's own prompt
//! size reached the long-context threshold. Cost is summed incrementally per
//! completed call, never recomputed from scratch, so a run's total is always
//! consistent with the subset of calls that have completed so far.

use crate::models::matching::{CallUsage, UsageMetrics};

/// Prompts at or above this size bill at the long-context tier.
pub const TIER_THRESHOLD_TOKENS: u64 = 200_000;

const INPUT_PRICE_PER_M: f64 = 2.00;
const INPUT_PRICE_PER_M_LONG: f64 = 4.00;
const OUTPUT_PRICE_PER_M: f64 = 12.00;
const OUTPUT_PRICE_PER_M_LONG: f64 = 18.00;

/// Dollar cost of a single call at that call's own tier.
pub fn call_cost(usage: &CallUsage) -> f64 {
    let (input_price, output_price) = if usage.prompt_tokens >= TIER_THRESHOLD_TOKENS {
        (INPUT_PRICE_PER_M_LONG, OUTPUT_PRICE_PER_M_LONG)
    } else {
        (INPUT_PRICE_PER_M, OUTPUT_PRICE_PER_M)
    };

    (usage.prompt_tokens as f64 / 1_000_000.0) * input_price
        + (usage.output_tokens as f64 / 1_000_000.0) * output_price
}

/// Folds one completed call into the run accumulator.
pub fn accumulate(metrics: &mut UsageMetrics, usage: &CallUsage) {
    metrics.prompt_tokens += usage.prompt_tokens;
    metrics.output_tokens += usage.output_tokens;
    metrics.total_cost += call_cost(usage);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_threshold_uses_base_tier() {
        let usage = CallUsage {
            prompt_tokens: 100_000,
            output_tokens: 10_000,
        };
        let expected = 0.1 * 2.00 + 0.01 * 12.00;
        assert!((call_cost(&usage) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_at_threshold_uses_long_tier() {
        let usage = CallUsage {
            prompt_tokens: TIER_THRESHOLD_TOKENS,
            output_tokens: 1_000_000,
        };
        let expected = 0.2 * 4.00 + 1.0 * 18.00;
        assert!((call_cost(&usage) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_tier_is_chosen_per_call_not_per_run() {
        let small = CallUsage {
            prompt_tokens: 150_000,
            output_tokens: 0,
        };
        let large = CallUsage {
            prompt_tokens: 250_000,
            output_tokens: 0,
        };

        let mut metrics = UsageMetrics::default();
        accumulate(&mut metrics, &small);
        accumulate(&mut metrics, &large);

        // 150k at 2.00/M plus 250k at 4.00/M; a run-level tier would differ.
        let expected = 0.15 * 2.00 + 0.25 * 4.00;
        assert!((metrics.total_cost - expected).abs() < 1e-12);
        assert_eq!(metrics.prompt_tokens, 400_000);
    }

    #[test]
    fn test_accumulator_never_decreases() {
        let mut metrics = UsageMetrics::default();
        let usage = CallUsage {
            prompt_tokens: 10,
            output_tokens: 5,
        };
        let mut last_cost = 0.0;
        for _ in 0..4 {
            accumulate(&mut metrics, &usage);
            assert!(metrics.total_cost >= last_cost);
            last_cost = metrics.total_cost;
        }
        assert_eq!(metrics.prompt_tokens, 40);
        assert_eq!(metrics.output_tokens, 20);
    }
}
