//! Outcome taxonomy and per-call artifacts.
//!
//! Every attempt produces exactly one immutable [`Outcome`]; the pipeline,
//! retry policy, and circuit breaker all consume its value-free
//! [`OutcomeKind`] projection.

mod classify;
mod record;

pub use classify::classify;
pub use record::{AttemptRecord, ExecutionResult};

use serde::{Deserialize, Serialize};

/// Failure taxonomy for a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Transport-level connectivity failure; retriable and breaker-countable.
    Transient,
    /// The attempt exceeded its per-attempt deadline.
    Timeout,
    /// The downstream completed with a server-side error status.
    ServerError(u16),
    /// The circuit breaker refused the call without invoking the operation.
    Rejected,
    /// A failure that retrying cannot help; recorded but never counted
    /// toward the breaker ratio.
    Fatal,
    /// The caller cancelled the call.
    Cancelled,
}

impl FailureKind {
    /// Returns true if the retry strategy may schedule another attempt.
    #[must_use]
    pub const fn is_retriable(self) -> bool {
        matches!(self, Self::Transient | Self::Timeout | Self::ServerError(_))
    }

    /// Returns true if the failure counts toward the breaker's failure ratio.
    #[must_use]
    pub const fn is_countable(self) -> bool {
        matches!(self, Self::Transient | Self::Timeout | Self::ServerError(_))
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transient => write!(f, "transient"),
            Self::Timeout => write!(f, "timeout"),
            Self::ServerError(code) => write!(f, "server error {code}"),
            Self::Rejected => write!(f, "rejected"),
            Self::Fatal => write!(f, "fatal"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Classified result of one attempt.
///
/// Produced once per attempt and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The attempt produced a usable value.
    Success(T),
    /// The attempt failed.
    Failure {
        /// Failure classification.
        kind: FailureKind,
        /// Human-readable diagnostic detail.
        detail: String,
    },
}

impl<T> Outcome<T> {
    /// Creates a failure outcome.
    #[must_use]
    pub fn failure(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            detail: detail.into(),
        }
    }

    /// Returns true for a success outcome.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The value-free projection consumed by the retry policy and breaker.
    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Success(_) => OutcomeKind::Success,
            Self::Failure { kind, .. } => OutcomeKind::Failure(*kind),
        }
    }

    /// Diagnostic detail, present on failures.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { detail, .. } => Some(detail),
        }
    }
}

/// Value-free projection of an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    /// The attempt succeeded.
    Success,
    /// The attempt failed with the given kind.
    Failure(FailureKind),
}

impl OutcomeKind {
    /// Returns true for a success.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns true if the retry strategy may schedule another attempt.
    #[must_use]
    pub const fn is_retriable(self) -> bool {
        match self {
            Self::Success => false,
            Self::Failure(kind) => kind.is_retriable(),
        }
    }

    /// Returns true if the outcome counts toward the breaker's failure ratio.
    #[must_use]
    pub const fn is_countable_failure(self) -> bool {
        match self {
            Self::Success => false,
            Self::Failure(kind) => kind.is_countable(),
        }
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure(kind) => write!(f, "{kind}"),
        }
    }
}

/// Unclassified yield of one invocation of the wrapped operation.
///
/// The pipeline has no opinion about what the operation does; collaborators
/// report back through this shape and [`classify`] maps it onto the outcome
/// taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawOutcome<T> {
    /// The transport completed and produced a response.
    Response {
        /// Protocol status code reported by the transport.
        status: u16,
        /// The decoded response value.
        value: T,
    },
    /// The transport failed before producing a response.
    Transport {
        /// Diagnostic detail.
        detail: String,
    },
    /// Any other error.
    Error {
        /// Diagnostic detail.
        detail: String,
    },
}

impl<T> RawOutcome<T> {
    /// Creates a completed response.
    #[must_use]
    pub const fn response(status: u16, value: T) -> Self {
        Self::Response { status, value }
    }

    /// Creates a transport-level connectivity failure.
    #[must_use]
    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            detail: detail.into(),
        }
    }

    /// Creates an unclassified error.
    #[must_use]
    pub fn error(detail: impl Into<String>) -> Self {
        Self::Error {
            detail: detail.into(),
        }
    }
}
