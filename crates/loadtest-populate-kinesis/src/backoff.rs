//! Exponential backoff between partial-failure retries.

use rand::Rng;
use std::time::Duration;

/// Delay of `base * 2^attempt` plus uniform jitter in `[0, jitter)`.
///
/// There is no cap: the delay keeps doubling with every attempt and
/// saturates at [`Duration::MAX`] instead of overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    pub base: Duration,
    pub jitter: Duration,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            jitter: Duration::from_secs(1),
        }
    }
}

impl ExponentialBackoff {
    pub fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    /// Delay before retry `attempt` (0-indexed).
    pub fn delay<R: Rng>(&self, attempt: u32, rng: &mut R) -> Duration {
        let exponential = 2u32
            .checked_pow(attempt)
            .and_then(|factor| self.base.checked_mul(factor))
            .unwrap_or(Duration::MAX);
        exponential.saturating_add(self.jitter_sample(rng))
    }

    /// Uniform in `[0, jitter)`, drawn in whole nanoseconds so the upper
    /// bound is never reached by rounding.
    fn jitter_sample<R: Rng>(&self, rng: &mut R) -> Duration {
        let nanos = u64::try_from(self.jitter.as_nanos()).unwrap_or(u64::MAX);
        if nanos == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(rng.random_range(0..nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_delay_within_bounds() {
        let backoff = ExponentialBackoff::default();
        let mut rng = StdRng::seed_from_u64(42);

        for attempt in 0..16 {
            let floor = Duration::from_secs(1 << attempt);
            for _ in 0..100 {
                let delay = backoff.delay(attempt, &mut rng);
                assert!(delay >= floor, "attempt {attempt}: {delay:?} < {floor:?}");
                assert!(delay < floor + Duration::from_secs(1));
            }
        }
    }

    #[test]
    fn test_jitter_never_reaches_its_bound() {
        // One nanosecond of jitter leaves zero as the only value below the bound.
        let backoff = ExponentialBackoff::new(Duration::from_secs(1), Duration::from_nanos(1));
        let mut rng = StdRng::seed_from_u64(3);

        for attempt in 0..8 {
            for _ in 0..200 {
                assert_eq!(
                    backoff.delay(attempt, &mut rng),
                    Duration::from_secs(1 << attempt)
                );
            }
        }
    }

    #[test]
    fn test_delay_saturates() {
        let backoff = ExponentialBackoff::default();
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(backoff.delay(40, &mut rng), Duration::MAX);
        assert_eq!(backoff.delay(u32::MAX, &mut rng), Duration::MAX);
    }

    #[test]
    fn test_custom_base_without_jitter() {
        let backoff = ExponentialBackoff::new(Duration::from_millis(10), Duration::ZERO);
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(backoff.delay(0, &mut rng), Duration::from_millis(10));
        assert_eq!(backoff.delay(3, &mut rng), Duration::from_millis(80));
    }
}
