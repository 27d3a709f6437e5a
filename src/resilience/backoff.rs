//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

/// Delay before reconnect attempt number `attempt` (1-based).
///
/// Doubles from `base_ms` and is capped at `max_ms`. Up to a fifth of the
/// delay is shaved off at random so that many gateways restarted together
/// do not reconnect in lockstep. The result never exceeds `max_ms`.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 || base_ms == 0 {
        return Duration::ZERO;
    }

    let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    let capped = base_ms.saturating_mul(factor).min(max_ms.max(base_ms));

    let spread = capped / 5;
    let jitter = if spread > 0 {
        rand::thread_rng().gen_range(0..=spread)
    } else {
        0
    };

    Duration::from_millis(capped - jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn within(delay: Duration, low: u64, high: u64) -> bool {
        (low..=high).contains(&(delay.as_millis() as u64))
    }

    #[test]
    fn test_first_attempts_double() {
        assert!(within(calculate_backoff(1, 500, 30_000), 400, 500));
        assert!(within(calculate_backoff(2, 500, 30_000), 800, 1_000));
        assert!(within(calculate_backoff(3, 500, 30_000), 1_600, 2_000));
    }

    #[test]
    fn test_capped_at_max() {
        for attempt in [10, 40, 64, 200] {
            assert!(within(calculate_backoff(attempt, 500, 30_000), 24_000, 30_000));
        }
    }

    #[test]
    fn test_zero_cases() {
        assert_eq!(calculate_backoff(0, 500, 30_000), Duration::ZERO);
        assert_eq!(calculate_backoff(3, 0, 30_000), Duration::ZERO);
    }
}
