//! Immutable per-call artifacts: attempt records and terminal results.

use super::{FailureKind, Outcome, OutcomeKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// A snapshot of one finished attempt cycle within a logical call.
///
/// Records are never mutated after creation; they are handed to event sinks
/// and folded into the breaker's rolling statistics, then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Correlates all attempts of one logical call.
    pub call_id: Uuid,
    /// 1-based attempt number.
    pub attempt: u32,
    /// Classified outcome of the attempt.
    pub outcome: OutcomeKind,
    /// Diagnostic detail for failures.
    pub detail: Option<String>,
    /// Wall-clock time at which the attempt finished.
    pub timestamp: DateTime<Utc>,
    /// Time spent inside the attempt.
    pub elapsed: Duration,
}

impl AttemptRecord {
    /// Builds a record from a classified outcome.
    #[must_use]
    pub fn from_outcome<T>(
        call_id: Uuid,
        attempt: u32,
        outcome: &Outcome<T>,
        elapsed: Duration,
    ) -> Self {
        Self {
            call_id,
            attempt,
            outcome: outcome.kind(),
            detail: outcome.detail().map(str::to_owned),
            timestamp: Utc::now(),
            elapsed,
        }
    }

    /// Converts the record to a JSON value for structured sink payloads.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Terminal artifact of one logical call through the pipeline.
///
/// Returned to the caller and never retained by the pipeline. The last
/// classified outcome and the attempt count let the caller distinguish
/// "gave up after N attempts" from "rejected by open circuit" from
/// "cancelled".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult<T> {
    /// The last classified outcome; holds the success value on success.
    pub outcome: Outcome<T>,
    /// Attempt cycles used, including the final one.
    pub attempts: u32,
    /// Total time across attempts and backoff waits.
    pub elapsed: Duration,
}

impl<T> ExecutionResult<T> {
    /// Returns true if the call produced a success value.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.outcome.is_success()
    }

    /// Borrows the success value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match &self.outcome {
            Outcome::Success(value) => Some(value),
            Outcome::Failure { .. } => None,
        }
    }

    /// Consumes the result and takes the success value, if any.
    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self.outcome {
            Outcome::Success(value) => Some(value),
            Outcome::Failure { .. } => None,
        }
    }

    /// The failure kind of the last outcome, if the call failed.
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self.outcome {
            Outcome::Success(_) => None,
            Outcome::Failure { kind, .. } => Some(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_record_from_failure_outcome() {
        let call_id = Uuid::new_v4();
        let outcome: Outcome<u32> = Outcome::failure(FailureKind::Transient, "reset by peer");
        let record =
            AttemptRecord::from_outcome(call_id, 2, &outcome, Duration::from_millis(12));

        assert_eq!(record.call_id, call_id);
        assert_eq!(record.attempt, 2);
        assert_eq!(record.outcome, OutcomeKind::Failure(FailureKind::Transient));
        assert_eq!(record.detail, Some("reset by peer".to_string()));
        assert_eq!(record.elapsed, Duration::from_millis(12));
    }

    #[test]
    fn test_record_from_success_has_no_detail() {
        let outcome = Outcome::Success("ok");
        let record =
            AttemptRecord::from_outcome(Uuid::new_v4(), 1, &outcome, Duration::ZERO);
        assert_eq!(record.outcome, OutcomeKind::Success);
        assert_eq!(record.detail, None);
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let outcome: Outcome<()> = Outcome::failure(FailureKind::ServerError(503), "unavailable");
        let record =
            AttemptRecord::from_outcome(Uuid::new_v4(), 1, &outcome, Duration::from_millis(5));

        let value = record.to_json();
        let back: AttemptRecord = serde_json::from_value(value).expect("valid record json");
        assert_eq!(back, record);
    }

    #[test]
    fn test_execution_result_accessors() {
        let ok = ExecutionResult {
            outcome: Outcome::Success(41),
            attempts: 1,
            elapsed: Duration::ZERO,
        };
        assert!(ok.succeeded());
        assert_eq!(ok.value(), Some(&41));
        assert_eq!(ok.failure_kind(), None);
        assert_eq!(ok.into_value(), Some(41));

        let failed: ExecutionResult<u32> = ExecutionResult {
            outcome: Outcome::failure(FailureKind::Rejected, "open circuit"),
            attempts: 1,
            elapsed: Duration::ZERO,
        };
        assert!(!failed.succeeded());
        assert_eq!(failed.value(), None);
        assert_eq!(failed.failure_kind(), Some(FailureKind::Rejected));
        assert_eq!(failed.into_value(), None);
    }
}
