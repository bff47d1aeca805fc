//! The execute loop.

use crate::breaker::{Admission, CircuitBreaker};
use crate::cancellation::CancelToken;
use crate::events::{EventSink, PipelineEvent};
use crate::outcome::{AttemptRecord, ExecutionResult, FailureKind, Outcome, RawOutcome};
use crate::retry::{RetryDecision, RetryPolicy};
use crate::timeout::{run_with_timeout, TimeoutPolicy};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

/// Executes operations under retry, timeout, and circuit-breaking policies.
///
/// A pipeline is bound to one downstream target. Its circuit breaker is the
/// only shared mutable state; everything else is per-call. The breaker may
/// be shared across pipelines for the same target via
/// [`PipelineBuilder::shared_breaker`](super::PipelineBuilder::shared_breaker),
/// and many concurrent calls may run through one pipeline instance.
pub struct Pipeline {
    pub(super) retry: RetryPolicy,
    pub(super) timeout: TimeoutPolicy,
    pub(super) breaker: Arc<CircuitBreaker>,
    pub(super) sink: Arc<dyn EventSink>,
    pub(super) rng: Mutex<StdRng>,
}

impl Pipeline {
    /// Starts a builder with default configuration.
    #[must_use]
    pub fn builder() -> super::PipelineBuilder {
        super::PipelineBuilder::new()
    }

    /// The breaker instance backing this pipeline.
    #[must_use]
    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Executes `operation` without external cancellation.
    ///
    /// See [`execute_with_token`](Self::execute_with_token).
    pub async fn execute<T, F, Fut>(&self, operation: F) -> ExecutionResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RawOutcome<T>>,
    {
        self.execute_with_token(operation, &CancelToken::new()).await
    }

    /// Executes `operation`, racing every suspension point against `token`.
    ///
    /// Each attempt cycle consults the breaker gate (a rejection is terminal
    /// for the whole call), runs the operation under the per-attempt
    /// deadline, classifies the result, feeds the breaker, and either
    /// returns or asks the retry policy for a delay before the next cycle.
    ///
    /// Expected failures are data: the returned result always carries the
    /// last classified outcome and the number of attempts used, so the
    /// caller can tell "gave up after N attempts" from "rejected by open
    /// circuit" from "cancelled".
    pub async fn execute_with_token<T, F, Fut>(
        &self,
        mut operation: F,
        token: &CancelToken,
    ) -> ExecutionResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RawOutcome<T>>,
    {
        let call_id = Uuid::new_v4();
        let started = Instant::now();
        let mut attempt: u32 = 1;

        loop {
            if token.is_cancelled() {
                return self
                    .finish_cancelled(call_id, attempt, Duration::ZERO, started, token)
                    .await;
            }

            let (admission, transition) = self.breaker.try_acquire();
            if let Some(transition) = transition {
                self.sink.emit(PipelineEvent::Transition(transition)).await;
            }

            if admission == Admission::Rejected {
                let outcome = Outcome::failure(FailureKind::Rejected, "circuit breaker is open");
                let record =
                    AttemptRecord::from_outcome(call_id, attempt, &outcome, Duration::ZERO);
                self.sink.emit(PipelineEvent::Attempt(record)).await;
                return ExecutionResult {
                    outcome,
                    attempts: attempt,
                    elapsed: started.elapsed(),
                };
            }
            let probe = admission == Admission::Probe;

            let attempt_started = Instant::now();
            let outcome: Outcome<T> = tokio::select! {
                biased;
                () = token.cancelled() => {
                    if probe {
                        self.breaker.release_probe();
                    }
                    return self
                        .finish_cancelled(
                            call_id,
                            attempt,
                            attempt_started.elapsed(),
                            started,
                            token,
                        )
                        .await;
                }
                outcome = run_with_timeout(self.timeout, operation()) => outcome,
            };

            let record = AttemptRecord::from_outcome(
                call_id,
                attempt,
                &outcome,
                attempt_started.elapsed(),
            );
            if let Some(transition) = self.breaker.record(record.outcome, probe) {
                self.sink.emit(PipelineEvent::Transition(transition)).await;
            }
            self.sink.emit(PipelineEvent::Attempt(record)).await;

            if outcome.is_success() {
                return ExecutionResult {
                    outcome,
                    attempts: attempt,
                    elapsed: started.elapsed(),
                };
            }

            let kind = outcome.kind();
            let decision = {
                let mut rng = self.rng.lock();
                self.retry.decide(attempt, kind, &mut *rng)
            };
            match decision {
                RetryDecision::Retry(delay) => {
                    debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        outcome = %kind,
                        "Retrying after failure"
                    );
                    tokio::select! {
                        biased;
                        () = token.cancelled() => {
                            return self
                                .finish_cancelled(call_id, attempt, Duration::ZERO, started, token)
                                .await;
                        }
                        () = tokio::time::sleep(delay) => {}
                    }
                    attempt += 1;
                }
                RetryDecision::GiveUp => {
                    return ExecutionResult {
                        outcome,
                        attempts: attempt,
                        elapsed: started.elapsed(),
                    };
                }
            }
        }
    }

    async fn finish_cancelled<T>(
        &self,
        call_id: Uuid,
        attempt: u32,
        attempt_elapsed: Duration,
        started: Instant,
        token: &CancelToken,
    ) -> ExecutionResult<T> {
        let detail = token
            .reason()
            .unwrap_or_else(|| "cancelled by caller".to_string());
        let outcome = Outcome::failure(FailureKind::Cancelled, detail);
        let record = AttemptRecord::from_outcome(call_id, attempt, &outcome, attempt_elapsed);
        self.sink.emit(PipelineEvent::Attempt(record)).await;
        ExecutionResult {
            outcome,
            attempts: attempt,
            elapsed: started.elapsed(),
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .field("breaker", &self.breaker)
            .finish()
    }
}
