//! Circuit breaker guarding a single downstream target.
//!
//! # States
//! - Closed: calls pass through; completed attempts feed the sample window
//! - Open: calls fail fast until the break duration elapses
//! - Half-Open: exactly one trial call probes the downstream
//!
//! # State Transitions
//! ```text
//! Closed → Open: window holds >= minimum_throughput samples and the
//!                countable-failure ratio >= failure_ratio
//! Open → Half-Open: first gate check at or after break_duration (lazy,
//!                   no timer task)
//! Half-Open → Closed: the probe resolves without a countable failure
//! Half-Open → Open: the probe resolves with a countable failure
//! ```
//!
//! The state machine and its rolling sample window are the single
//! serialization point for concurrent callers; every read and mutation runs
//! under one mutex. Transitions are returned to the caller so events can be
//! emitted after the lock is released.

mod registry;
mod window;

pub use registry::BreakerRegistry;

use crate::errors::ConfigError;
use crate::outcome::OutcomeKind;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use window::SampleWindow;

/// Configuration for the circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Fraction of countable failures within the window that trips the
    /// circuit. Must lie in (0, 1].
    pub failure_ratio: f64,
    /// Trailing interval over which the ratio is computed.
    pub sampling_window: Duration,
    /// Minimum samples in the window before the ratio is consulted.
    pub minimum_throughput: usize,
    /// How long the circuit stays open before admitting a probe.
    pub break_duration: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_ratio: 0.5,
            sampling_window: Duration::from_secs(60),
            minimum_throughput: 10,
            break_duration: Duration::from_secs(30),
        }
    }
}

impl BreakerConfig {
    /// Creates a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the failure ratio threshold.
    #[must_use]
    pub fn with_failure_ratio(mut self, ratio: f64) -> Self {
        self.failure_ratio = ratio;
        self
    }

    /// Sets the sampling window.
    #[must_use]
    pub fn with_sampling_window(mut self, window: Duration) -> Self {
        self.sampling_window = window;
        self
    }

    /// Sets the minimum throughput.
    #[must_use]
    pub fn with_minimum_throughput(mut self, throughput: usize) -> Self {
        self.minimum_throughput = throughput;
        self
    }

    /// Sets the break duration.
    #[must_use]
    pub fn with_break_duration(mut self, duration: Duration) -> Self {
        self.break_duration = duration;
        self
    }

    /// Validates the config.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first invalid option.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.failure_ratio <= 0.0 || self.failure_ratio > 1.0 {
            return Err(ConfigError::RatioOutOfRange(self.failure_ratio));
        }
        if self.minimum_throughput < 1 {
            return Err(ConfigError::ZeroThroughput);
        }
        if self.sampling_window.is_zero() {
            return Err(ConfigError::NonPositiveWindow(self.sampling_window));
        }
        if self.break_duration.is_zero() {
            return Err(ConfigError::NonPositiveBreak(self.break_duration));
        }
        Ok(())
    }
}

/// Externally visible breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakerState {
    /// Calls pass through.
    Closed,
    /// Calls fail fast.
    Open,
    /// One trial call probes the downstream.
    HalfOpen,
}

impl std::fmt::Display for BreakerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// A state change, surfaced to event sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerTransition {
    /// State before the change.
    pub from: BreakerState,
    /// State after the change.
    pub to: BreakerState,
    /// Wall-clock time of the change.
    pub at: DateTime<Utc>,
}

impl BreakerTransition {
    fn new(from: BreakerState, to: BreakerState) -> Self {
        Self {
            from,
            to,
            at: Utc::now(),
        }
    }

    /// Converts the transition to a JSON value for structured sink payloads.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Gate decision for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The call may proceed under a closed circuit.
    Allowed,
    /// The call is the single half-open trial.
    Probe,
    /// The circuit refuses the call.
    Rejected,
}

enum State {
    Closed,
    Open { opened_at: Instant },
    HalfOpen { probe_in_flight: bool },
}

struct Inner {
    state: State,
    window: SampleWindow,
}

/// Circuit breaker bound to one downstream target.
///
/// One instance guards one logical endpoint; independent targets use
/// independent instances (see [`BreakerRegistry`]). Shared between
/// concurrent callers behind an `Arc`.
pub struct CircuitBreaker {
    config: BreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Creates a breaker in the closed state.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is invalid.
    pub fn new(config: BreakerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    /// Builds a breaker from a config that has already been validated.
    pub(crate) fn from_validated(config: BreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner {
                state: State::Closed,
                window: SampleWindow::new(config.sampling_window),
            }),
        }
    }

    /// The configuration this breaker was built with.
    #[must_use]
    pub const fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Current externally visible state.
    ///
    /// Read-only; the lazy Open → Half-Open move happens on the next
    /// [`try_acquire`](Self::try_acquire), not here.
    #[must_use]
    pub fn state(&self) -> BreakerState {
        match self.inner.lock().state {
            State::Closed => BreakerState::Closed,
            State::Open { .. } => BreakerState::Open,
            State::HalfOpen { .. } => BreakerState::HalfOpen,
        }
    }

    /// Number of samples currently within the window.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let (count, _) = inner.window.snapshot(now);
        count
    }

    /// Consults the gate for one call.
    ///
    /// While open, the first check at or after `break_duration` moves the
    /// circuit to half-open and admits the caller as the single probe;
    /// competitors are rejected until that probe resolves.
    pub fn try_acquire(&self) -> (Admission, Option<BreakerTransition>) {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        match inner.state {
            State::Closed => (Admission::Allowed, None),
            State::Open { opened_at } => {
                if now.duration_since(opened_at) >= self.config.break_duration {
                    inner.state = State::HalfOpen {
                        probe_in_flight: true,
                    };
                    (
                        Admission::Probe,
                        Some(BreakerTransition::new(
                            BreakerState::Open,
                            BreakerState::HalfOpen,
                        )),
                    )
                } else {
                    (Admission::Rejected, None)
                }
            }
            State::HalfOpen { probe_in_flight } => {
                if probe_in_flight {
                    (Admission::Rejected, None)
                } else {
                    inner.state = State::HalfOpen {
                        probe_in_flight: true,
                    };
                    (Admission::Probe, None)
                }
            }
        }
    }

    /// Folds a completed attempt into the breaker.
    ///
    /// `probe` marks the half-open trial admitted by
    /// [`try_acquire`](Self::try_acquire). Rejected and cancelled outcomes
    /// never reach this method; the window samples completed attempts only.
    pub fn record(&self, outcome: OutcomeKind, probe: bool) -> Option<BreakerTransition> {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        if probe {
            return Self::resolve_probe(&mut inner, outcome, now);
        }

        match inner.state {
            State::Closed => {
                inner.window.push(now, outcome.is_countable_failure());
                let (count, ratio) = inner.window.snapshot(now);
                if count >= self.config.minimum_throughput && ratio >= self.config.failure_ratio
                {
                    inner.state = State::Open { opened_at: now };
                    return Some(BreakerTransition::new(
                        BreakerState::Closed,
                        BreakerState::Open,
                    ));
                }
                None
            }
            // An attempt admitted under a closed circuit can resolve after
            // the circuit tripped. Its sample still lands in the window;
            // late statistics never flip the state machine.
            State::Open { .. } | State::HalfOpen { .. } => {
                inner.window.push(now, outcome.is_countable_failure());
                None
            }
        }
    }

    /// Releases the half-open slot when the probe never resolved, e.g. the
    /// probing call was cancelled mid-flight. The next caller may probe.
    pub fn release_probe(&self) {
        let mut inner = self.inner.lock();
        if let State::HalfOpen {
            probe_in_flight: true,
        } = inner.state
        {
            inner.state = State::HalfOpen {
                probe_in_flight: false,
            };
        }
    }

    /// Returns the breaker to closed with an empty sample window.
    pub fn reset(&self) -> Option<BreakerTransition> {
        let mut inner = self.inner.lock();
        let from = match inner.state {
            State::Closed => return None,
            State::Open { .. } => BreakerState::Open,
            State::HalfOpen { .. } => BreakerState::HalfOpen,
        };
        inner.state = State::Closed;
        inner.window.clear();
        Some(BreakerTransition::new(from, BreakerState::Closed))
    }

    fn resolve_probe(
        inner: &mut Inner,
        outcome: OutcomeKind,
        now: Instant,
    ) -> Option<BreakerTransition> {
        match inner.state {
            State::HalfOpen { .. } => {
                if outcome.is_countable_failure() {
                    inner.state = State::Open { opened_at: now };
                    Some(BreakerTransition::new(
                        BreakerState::HalfOpen,
                        BreakerState::Open,
                    ))
                } else {
                    // Success and non-countable outcomes both close the
                    // circuit.
                    inner.state = State::Closed;
                    inner.window.clear();
                    Some(BreakerTransition::new(
                        BreakerState::HalfOpen,
                        BreakerState::Closed,
                    ))
                }
            }
            State::Closed | State::Open { .. } => None,
        }
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish()
    }
}
