//! Retry policy with configurable backoff and jitter.
//!
//! The policy is a pure decision function: given the attempt number and the
//! classified outcome it answers "retry after this delay" or "give up".
//! Jittered delays draw from a caller-supplied random source, so decisions
//! are deterministic under a seeded generator.

use crate::errors::ConfigError;
use crate::outcome::OutcomeKind;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backoff shape for delays between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Backoff {
    /// delay = base_delay for every attempt.
    None,
    /// delay = base_delay * 2^(attempt - 1).
    #[default]
    Exponential,
}

/// Configuration for the retry strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum attempts, including the initial one.
    pub max_attempts: u32,
    /// Base delay between attempts.
    pub base_delay: Duration,
    /// Backoff shape.
    pub backoff: Backoff,
    /// Whether to perturb delays by a uniform draw from [0.5, 1.5).
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            backoff: Backoff::Exponential,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum attempts.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the base delay.
    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Sets the backoff shape.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Enables or disables jitter.
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Validates the policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroMaxAttempts`] when `max_attempts` is 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts < 1 {
            return Err(ConfigError::ZeroMaxAttempts);
        }
        Ok(())
    }

    /// Nominal (pre-jitter) delay after attempt number `attempt`.
    #[must_use]
    pub fn nominal_delay(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::None => self.base_delay,
            Backoff::Exponential => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                self.base_delay.saturating_mul(factor)
            }
        }
    }

    /// Decides what to do after attempt number `attempt` finished with
    /// `outcome`.
    ///
    /// Only transient, timeout, and server-error failures are retried;
    /// everything else gives up immediately, as does exhausting
    /// `max_attempts`.
    pub fn decide<R: Rng>(
        &self,
        attempt: u32,
        outcome: OutcomeKind,
        rng: &mut R,
    ) -> RetryDecision {
        if !outcome.is_retriable() {
            return RetryDecision::GiveUp;
        }
        if attempt >= self.max_attempts {
            return RetryDecision::GiveUp;
        }

        let mut delay = self.nominal_delay(attempt);
        if self.jitter {
            delay = delay.mul_f64(rng.gen_range(0.5..1.5));
        }
        RetryDecision::Retry(delay)
    }
}

/// Decision produced by [`RetryPolicy::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Schedule another attempt after the delay.
    Retry(Duration),
    /// Stop; the last outcome is terminal.
    GiveUp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::FailureKind;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn transient() -> OutcomeKind {
        OutcomeKind::Failure(FailureKind::Transient)
    }

    #[test]
    fn test_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(100));
        assert_eq!(policy.backoff, Backoff::Exponential);
        assert!(policy.jitter);
    }

    #[test]
    fn test_builder() {
        let policy = RetryPolicy::new()
            .with_max_attempts(5)
            .with_base_delay(Duration::from_millis(50))
            .with_backoff(Backoff::None)
            .with_jitter(false);

        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(50));
        assert_eq!(policy.backoff, Backoff::None);
        assert!(!policy.jitter);
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let policy = RetryPolicy::new().with_max_attempts(0);
        assert_eq!(policy.validate(), Err(ConfigError::ZeroMaxAttempts));
        assert_eq!(RetryPolicy::new().validate(), Ok(()));
    }

    #[test]
    fn test_exponential_nominal_delays() {
        let policy = RetryPolicy::new()
            .with_base_delay(Duration::from_millis(100))
            .with_jitter(false);

        assert_eq!(policy.nominal_delay(1), Duration::from_millis(100));
        assert_eq!(policy.nominal_delay(2), Duration::from_millis(200));
        assert_eq!(policy.nominal_delay(3), Duration::from_millis(400));
        assert_eq!(policy.nominal_delay(4), Duration::from_millis(800));
    }

    #[test]
    fn test_constant_nominal_delay() {
        let policy = RetryPolicy::new()
            .with_base_delay(Duration::from_millis(100))
            .with_backoff(Backoff::None);

        assert_eq!(policy.nominal_delay(1), Duration::from_millis(100));
        assert_eq!(policy.nominal_delay(6), Duration::from_millis(100));
    }

    #[test]
    fn test_decide_without_jitter() {
        let policy = RetryPolicy::new()
            .with_max_attempts(3)
            .with_jitter(false);
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(
            policy.decide(1, transient(), &mut rng),
            RetryDecision::Retry(Duration::from_millis(100))
        );
        assert_eq!(
            policy.decide(2, transient(), &mut rng),
            RetryDecision::Retry(Duration::from_millis(200))
        );
        assert_eq!(policy.decide(3, transient(), &mut rng), RetryDecision::GiveUp);
    }

    #[test]
    fn test_jittered_delay_bounds() {
        let policy = RetryPolicy::new().with_max_attempts(10);
        let mut rng = StdRng::seed_from_u64(42);

        for attempt in 1..5 {
            let nominal = policy.nominal_delay(attempt);
            for _ in 0..50 {
                match policy.decide(attempt, transient(), &mut rng) {
                    RetryDecision::Retry(delay) => {
                        assert!(delay >= nominal.mul_f64(0.5), "delay {delay:?} below bound");
                        assert!(delay < nominal.mul_f64(1.5), "delay {delay:?} above bound");
                    }
                    RetryDecision::GiveUp => panic!("unexpected give-up"),
                }
            }
        }
    }

    #[test]
    fn test_jitter_is_deterministic_for_a_seed() {
        let policy = RetryPolicy::new().with_max_attempts(10);

        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for attempt in 1..5 {
            assert_eq!(
                policy.decide(attempt, transient(), &mut a),
                policy.decide(attempt, transient(), &mut b)
            );
        }
    }

    #[test]
    fn test_non_retriable_outcomes_give_up() {
        let policy = RetryPolicy::new().with_max_attempts(10);
        let mut rng = StdRng::seed_from_u64(0);

        for kind in [
            FailureKind::Fatal,
            FailureKind::Rejected,
            FailureKind::Cancelled,
        ] {
            assert_eq!(
                policy.decide(1, OutcomeKind::Failure(kind), &mut rng),
                RetryDecision::GiveUp
            );
        }
        assert_eq!(
            policy.decide(1, OutcomeKind::Success, &mut rng),
            RetryDecision::GiveUp
        );
    }

    #[test]
    fn test_retriable_kinds_retry() {
        let policy = RetryPolicy::new().with_max_attempts(2).with_jitter(false);
        let mut rng = StdRng::seed_from_u64(0);

        for kind in [
            FailureKind::Transient,
            FailureKind::Timeout,
            FailureKind::ServerError(502),
        ] {
            assert!(matches!(
                policy.decide(1, OutcomeKind::Failure(kind), &mut rng),
                RetryDecision::Retry(_)
            ));
        }
    }
}
