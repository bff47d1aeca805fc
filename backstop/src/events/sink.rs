//! Event sink trait and implementations.

use super::PipelineEvent;
use crate::breaker::BreakerTransition;
use crate::outcome::AttemptRecord;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, Level};

/// Trait for sinks that receive pipeline notifications.
///
/// Sinks are used for logging, metrics, and test instrumentation. Emission
/// must not fail; sinks swallow their own errors.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Delivers one event.
    async fn emit(&self, event: PipelineEvent);
}

/// A no-op sink that discards all events.
///
/// Used as the default when no sink is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: PipelineEvent) {
        // Intentionally empty - discards all events
    }
}

/// A sink that logs events through the tracing framework.
#[derive(Debug, Clone)]
pub struct TracingEventSink {
    /// The log level to use.
    level: Level,
}

impl Default for TracingEventSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl TracingEventSink {
    /// Creates a new tracing sink with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Creates an info-level sink.
    #[must_use]
    pub fn info() -> Self {
        Self::new(Level::INFO)
    }
}

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: PipelineEvent) {
        let payload = event.to_json();
        match self.level {
            Level::DEBUG => {
                debug!(
                    event_type = %event.event_type(),
                    payload = %payload,
                    "Event: {}",
                    event.event_type()
                );
            }
            _ => {
                info!(
                    event_type = %event.event_type(),
                    payload = %payload,
                    "Event: {}",
                    event.event_type()
                );
            }
        }
    }
}

/// A collecting sink for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: parking_lot::RwLock<Vec<PipelineEvent>>,
}

impl CollectingEventSink {
    /// Creates an empty collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events received so far.
    #[must_use]
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.read().clone()
    }

    /// The attempt records received so far.
    #[must_use]
    pub fn attempt_records(&self) -> Vec<AttemptRecord> {
        self.events
            .read()
            .iter()
            .filter_map(|event| match event {
                PipelineEvent::Attempt(record) => Some(record.clone()),
                PipelineEvent::Transition(_) => None,
            })
            .collect()
    }

    /// The breaker transitions received so far.
    #[must_use]
    pub fn transitions(&self) -> Vec<BreakerTransition> {
        self.events
            .read()
            .iter()
            .filter_map(|event| match event {
                PipelineEvent::Transition(transition) => Some(*transition),
                PipelineEvent::Attempt(_) => None,
            })
            .collect()
    }

    /// Discards collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event: PipelineEvent) {
        self.events.write().push(event);
    }
}

/// A sink that broadcasts each event to several downstream sinks.
#[derive(Default)]
pub struct FanoutEventSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutEventSink {
    /// Creates an empty fanout sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a downstream sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl std::fmt::Debug for FanoutEventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutEventSink")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

#[async_trait]
impl EventSink for FanoutEventSink {
    async fn emit(&self, event: PipelineEvent) {
        futures::future::join_all(
            self.sinks
                .iter()
                .map(|sink| sink.emit(event.clone())),
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{FailureKind, Outcome};
    use std::time::Duration;
    use uuid::Uuid;

    fn attempt_event(attempt: u32) -> PipelineEvent {
        let outcome: Outcome<()> = Outcome::failure(FailureKind::Transient, "reset");
        PipelineEvent::Attempt(AttemptRecord::from_outcome(
            Uuid::new_v4(),
            attempt,
            &outcome,
            Duration::ZERO,
        ))
    }

    #[tokio::test]
    async fn test_collecting_sink_gathers_events() {
        let sink = CollectingEventSink::new();
        sink.emit(attempt_event(1)).await;
        sink.emit(attempt_event(2)).await;

        let records = sink.attempt_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].attempt, 1);
        assert_eq!(records[1].attempt, 2);
        assert!(sink.transitions().is_empty());

        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_noop_sink_discards() {
        let sink = NoOpEventSink;
        sink.emit(attempt_event(1)).await;
    }

    #[tokio::test]
    async fn test_fanout_delivers_to_all_sinks() {
        let first = Arc::new(CollectingEventSink::new());
        let second = Arc::new(CollectingEventSink::new());
        let fanout = FanoutEventSink::new()
            .with_sink(first.clone() as Arc<dyn EventSink>)
            .with_sink(second.clone() as Arc<dyn EventSink>);

        fanout.emit(attempt_event(1)).await;

        assert_eq!(first.events().len(), 1);
        assert_eq!(second.events().len(), 1);
    }
}
