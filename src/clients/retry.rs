//! Retry and backoff policy for the request executor.
//!
//! An attempt is retried only when its response status is 408, 429 or any
//! 5xx. The delay before retry *n* (1-based) is
//! `min(initial_delay * 2^(n-1), max_delay)`, multiplied by a uniformly
//! random factor in `[1 - jitter, 1 + jitter]`.

use std::time::Duration;

use rand::Rng;

use crate::error::ConfigError;

/// Delay before the first retry.
pub const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Upper bound for the un-jittered delay.
pub const MAX_RETRY_DELAY: Duration = Duration::from_millis(60_000);

/// Number of retries when neither the request nor the policy says otherwise.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Fraction of the base delay used as jitter in either direction.
pub const JITTER_FACTOR: f64 = 0.2;

/// Bounded exponential backoff configuration.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use taskmaster_sdk::clients::RetryPolicy;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.base_delay(1), Duration::from_millis(1000));
/// assert_eq!(policy.base_delay(3), Duration::from_millis(4000));
/// assert!(RetryPolicy::is_retryable_status(503));
/// assert!(!RetryPolicy::is_retryable_status(404));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap applied to the exponential delay before jitter.
    pub max_delay: Duration,
    /// Retries performed after the initial attempt.
    pub max_retries: u32,
    /// Jitter fraction in `[0, 1]`.
    pub jitter: f64,
    /// Also retry attempts that failed at the transport level
    /// (connection refused, reset, DNS). Timeouts and aborts never retry.
    pub retry_transport_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: INITIAL_RETRY_DELAY,
            max_delay: MAX_RETRY_DELAY,
            max_retries: DEFAULT_MAX_RETRIES,
            jitter: JITTER_FACTOR,
            retry_transport_errors: false,
        }
    }
}

impl RetryPolicy {
    /// Returns a policy that never retries.
    #[must_use]
    pub fn no_retries() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Returns `true` for statuses worth another attempt: 408, 429 and 5xx.
    #[must_use]
    pub const fn is_retryable_status(status: u16) -> bool {
        status == 408 || status == 429 || status >= 500
    }

    /// Checks that the policy is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRetryPolicy`] if the jitter fraction is
    /// outside `[0, 1]` or the initial delay exceeds the maximum delay.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(ConfigError::InvalidRetryPolicy {
                reason: format!("jitter must be within [0, 1], got {}", self.jitter),
            });
        }
        if self.initial_delay > self.max_delay {
            return Err(ConfigError::InvalidRetryPolicy {
                reason: format!(
                    "initial delay {:?} exceeds max delay {:?}",
                    self.initial_delay, self.max_delay
                ),
            });
        }
        Ok(())
    }

    /// Returns the un-jittered delay before retry `retry` (1-based).
    #[must_use]
    pub fn base_delay(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1);
        2u32.checked_pow(exponent)
            .and_then(|factor| self.initial_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Returns the jittered delay before retry `retry` (1-based).
    #[must_use]
    pub fn delay(&self, retry: u32) -> Duration {
        self.apply_jitter(self.base_delay(retry), &mut rand::thread_rng())
    }

    /// Scales `base` by a random multiplier in `[1 - jitter, 1 + jitter]`.
    pub fn apply_jitter<R: Rng + ?Sized>(&self, base: Duration, rng: &mut R) -> Duration {
        if self.jitter <= 0.0 {
            return base;
        }
        let multiplier = rng.gen_range(-1.0..=1.0_f64).mul_add(self.jitter, 1.0);
        Duration::try_from_secs_f64(base.as_secs_f64() * multiplier.max(0.0))
            .unwrap_or(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_policy_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.initial_delay, Duration::from_millis(1000));
        assert_eq!(policy.max_delay, Duration::from_millis(60_000));
        assert_eq!(policy.max_retries, 2);
        assert!((policy.jitter - 0.2).abs() < f64::EPSILON);
        assert!(!policy.retry_transport_errors);
    }

    #[test]
    fn test_retryable_statuses() {
        for status in [408, 429, 500, 502, 503, 504, 599] {
            assert!(RetryPolicy::is_retryable_status(status), "{status}");
        }
        for status in [200, 201, 301, 400, 401, 403, 404, 409, 422] {
            assert!(!RetryPolicy::is_retryable_status(status), "{status}");
        }
    }

    #[test]
    fn test_base_delays_double_per_retry() {
        let policy = RetryPolicy::default();
        let delays: Vec<u128> = (1..=4).map(|n| policy.base_delay(n).as_millis()).collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000]);
    }

    #[test]
    fn test_base_delay_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.base_delay(7), Duration::from_millis(60_000));
        assert_eq!(policy.base_delay(40), Duration::from_millis(60_000));
        assert_eq!(policy.base_delay(u32::MAX), Duration::from_millis(60_000));
    }

    #[test]
    fn test_jittered_delay_stays_within_bounds() {
        let policy = RetryPolicy::default();
        let mut rng = StdRng::seed_from_u64(7);
        for retry in 1..=4 {
            let base = policy.base_delay(retry);
            for _ in 0..200 {
                let delay = policy.apply_jitter(base, &mut rng);
                assert!(delay >= base.mul_f64(0.8), "{delay:?} below bound");
                assert!(delay <= base.mul_f64(1.2), "{delay:?} above bound");
            }
        }
    }

    #[test]
    fn test_zero_jitter_returns_base() {
        let policy = RetryPolicy {
            jitter: 0.0,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay(2), Duration::from_millis(2000));
    }

    #[test]
    fn test_jitter_on_unbounded_delay_saturates_at_max() {
        let policy = RetryPolicy {
            initial_delay: Duration::MAX,
            max_delay: Duration::MAX,
            ..RetryPolicy::default()
        };
        assert!(policy.validate().is_ok());

        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let delay = policy.apply_jitter(policy.base_delay(1), &mut rng);
            assert!(delay >= Duration::MAX.mul_f64(0.79), "{delay:?} below bound");
        }
    }

    #[test]
    fn test_validate_rejects_bad_jitter_and_delays() {
        let bad_jitter = RetryPolicy {
            jitter: 1.5,
            ..RetryPolicy::default()
        };
        assert!(matches!(
            bad_jitter.validate(),
            Err(ConfigError::InvalidRetryPolicy { .. })
        ));

        let inverted = RetryPolicy {
            initial_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(1),
            ..RetryPolicy::default()
        };
        assert!(inverted.validate().is_err());
        assert!(RetryPolicy::default().validate().is_ok());
    }

    #[test]
    fn test_no_retries_policy() {
        assert_eq!(RetryPolicy::no_retries().max_retries, 0);
    }
}
