//! Pure classification of raw attempt results.

use super::{FailureKind, Outcome, RawOutcome};

/// Maps the raw yield of one attempt onto the outcome taxonomy.
///
/// Rules:
/// - a transport-level connectivity failure is `Transient`
/// - a completed response with a status in `[500, 600)` is a `ServerError`
/// - any other completed response is a `Success`
/// - anything else is `Fatal`
///
/// Deadline expiry is classified by the timeout strategy, which never hands
/// an expired attempt to this function.
pub fn classify<T>(raw: RawOutcome<T>) -> Outcome<T> {
    match raw {
        RawOutcome::Response { status, value: _ } if (500..600).contains(&status) => {
            Outcome::failure(
                FailureKind::ServerError(status),
                format!("server responded with status {status}"),
            )
        }
        RawOutcome::Response { value, .. } => Outcome::Success(value),
        RawOutcome::Transport { detail } => Outcome::failure(FailureKind::Transient, detail),
        RawOutcome::Error { detail } => Outcome::failure(FailureKind::Fatal, detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::OutcomeKind;

    #[test]
    fn test_transport_error_is_transient() {
        let outcome: Outcome<()> = classify(RawOutcome::transport("connection refused"));
        assert_eq!(
            outcome.kind(),
            OutcomeKind::Failure(FailureKind::Transient)
        );
        assert_eq!(outcome.detail(), Some("connection refused"));
    }

    #[test]
    fn test_5xx_is_server_error() {
        for status in [500, 503, 599] {
            let outcome = classify(RawOutcome::response(status, "body"));
            assert_eq!(
                outcome.kind(),
                OutcomeKind::Failure(FailureKind::ServerError(status))
            );
        }
    }

    #[test]
    fn test_600_is_not_server_error() {
        let outcome = classify(RawOutcome::response(600, "body"));
        assert!(outcome.is_success());
    }

    #[test]
    fn test_other_responses_are_success() {
        for status in [200, 204, 301, 404, 499] {
            let outcome = classify(RawOutcome::response(status, "body"));
            assert!(outcome.is_success(), "status {status} should be a success");
        }
    }

    #[test]
    fn test_other_errors_are_fatal() {
        let outcome: Outcome<()> = classify(RawOutcome::error("malformed request"));
        assert_eq!(outcome.kind(), OutcomeKind::Failure(FailureKind::Fatal));
    }
}
