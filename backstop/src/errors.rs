//! Error types for the backstop crate.
//!
//! Expected failures (retry exhaustion, breaker rejection, cancellation) are
//! data, carried in [`Outcome`](crate::outcome::Outcome) values. The only
//! errors this crate raises are configuration mistakes, detected at
//! construction time before any call is accepted.

use std::time::Duration;
use thiserror::Error;

/// Invalid configuration rejected at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// `max_attempts` must be at least 1; the first try counts as attempt 1.
    #[error("max_attempts must be at least 1")]
    ZeroMaxAttempts,

    /// The per-attempt timeout must be positive.
    #[error("per_attempt timeout must be positive (got {0:?})")]
    NonPositiveTimeout(Duration),

    /// The failure ratio must lie in (0, 1].
    #[error("failure_ratio must be in (0, 1] (got {0})")]
    RatioOutOfRange(f64),

    /// `minimum_throughput` must be at least 1.
    #[error("minimum_throughput must be at least 1")]
    ZeroThroughput,

    /// The sampling window must be positive.
    #[error("sampling_window must be positive (got {0:?})")]
    NonPositiveWindow(Duration),

    /// The break duration must be positive.
    #[error("break_duration must be positive (got {0:?})")]
    NonPositiveBreak(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConfigError::ZeroMaxAttempts.to_string(),
            "max_attempts must be at least 1"
        );
        assert!(ConfigError::RatioOutOfRange(1.5).to_string().contains("1.5"));
        assert!(ConfigError::NonPositiveWindow(Duration::ZERO)
            .to_string()
            .contains("sampling_window"));
    }
}
