//! Per-attempt deadline enforcement.

use crate::errors::ConfigError;
use crate::outcome::{classify, FailureKind, Outcome, RawOutcome};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Configuration for the per-attempt timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutPolicy {
    /// Deadline for a single attempt.
    pub per_attempt: Duration,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            per_attempt: Duration::from_millis(750),
        }
    }
}

impl TimeoutPolicy {
    /// Creates a policy with the default deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-attempt deadline.
    #[must_use]
    pub fn with_per_attempt(mut self, deadline: Duration) -> Self {
        self.per_attempt = deadline;
        self
    }

    /// Validates the policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonPositiveTimeout`] when the deadline is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.per_attempt.is_zero() {
            return Err(ConfigError::NonPositiveTimeout(self.per_attempt));
        }
        Ok(())
    }
}

/// Races one attempt against the configured deadline.
///
/// If the attempt completes first, its raw result is classified normally.
/// If the deadline fires first, the attempt future is dropped, which cancels
/// it best-effort: work that never yields at an await point cannot be
/// preempted and the underlying operation must honor cancellation on its own
/// to truly abort. Exactly one of the two sides determines the returned
/// outcome.
pub async fn run_with_timeout<T, Fut>(policy: TimeoutPolicy, attempt: Fut) -> Outcome<T>
where
    Fut: Future<Output = RawOutcome<T>>,
{
    match tokio::time::timeout(policy.per_attempt, attempt).await {
        Ok(raw) => classify(raw),
        Err(_) => Outcome::failure(
            FailureKind::Timeout,
            format!(
                "attempt exceeded the {}ms deadline",
                policy.per_attempt.as_millis()
            ),
        ),
    }
}
