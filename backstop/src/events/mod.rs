//! Event emission for external observability collaborators.
//!
//! The pipeline reports every attempt and every breaker transition through
//! an [`EventSink`]; it has no opinion about formatting or destination.

mod sink;

pub use sink::{CollectingEventSink, EventSink, FanoutEventSink, NoOpEventSink, TracingEventSink};

use crate::breaker::BreakerTransition;
use crate::outcome::AttemptRecord;
use serde::{Deserialize, Serialize};

/// A notification emitted by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// One attempt cycle finished, including rejections and cancellations.
    Attempt(AttemptRecord),
    /// The circuit breaker changed state.
    Transition(BreakerTransition),
}

impl PipelineEvent {
    /// Short event-type tag, e.g. `"pipeline.attempt"`.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Attempt(_) => "pipeline.attempt",
            Self::Transition(_) => "breaker.transition",
        }
    }

    /// Converts the event to a JSON value for structured payloads.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{FailureKind, Outcome};
    use std::time::Duration;
    use uuid::Uuid;

    #[test]
    fn test_event_type_tags() {
        let outcome: Outcome<()> = Outcome::failure(FailureKind::Transient, "reset");
        let record = AttemptRecord::from_outcome(Uuid::new_v4(), 1, &outcome, Duration::ZERO);
        assert_eq!(
            PipelineEvent::Attempt(record).event_type(),
            "pipeline.attempt"
        );
    }

    #[test]
    fn test_to_json_carries_the_record() {
        let outcome: Outcome<()> = Outcome::failure(FailureKind::Timeout, "deadline");
        let record = AttemptRecord::from_outcome(Uuid::new_v4(), 3, &outcome, Duration::ZERO);
        let json = PipelineEvent::Attempt(record).to_json();
        assert_eq!(json["Attempt"]["attempt"], 3);
    }
}
