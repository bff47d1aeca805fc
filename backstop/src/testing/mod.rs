//! Scripted fakes for exercising pipelines in tests.
//!
//! Kept in the public API so downstream crates can drive a pipeline without
//! standing up a real transport.

use crate::outcome::RawOutcome;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// An operation double that replays a scripted sequence of raw outcomes and
/// records how often it was invoked.
///
/// Once the script is exhausted, every further invocation returns a clone of
/// the fallback outcome.
#[derive(Debug)]
pub struct ScriptedOperation<T> {
    script: Mutex<VecDeque<RawOutcome<T>>>,
    fallback: RawOutcome<T>,
    calls: Mutex<usize>,
}

impl<T: Clone> ScriptedOperation<T> {
    /// Replays `script` in order, then keeps returning `fallback`.
    #[must_use]
    pub fn new(script: Vec<RawOutcome<T>>, fallback: RawOutcome<T>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: Mutex::new(0),
        }
    }

    /// Always returns `raw`.
    #[must_use]
    pub fn always(raw: RawOutcome<T>) -> Self {
        Self::new(Vec::new(), raw)
    }

    /// Fails with `failure` for the first `n` calls, then succeeds with a
    /// 200-status response carrying `value`.
    #[must_use]
    pub fn fail_n_times(n: usize, failure: RawOutcome<T>, value: T) -> Self {
        let script: Vec<RawOutcome<T>> =
            std::iter::repeat_with(|| failure.clone()).take(n).collect();
        Self::new(script, RawOutcome::response(200, value))
    }

    /// Returns the next scripted outcome.
    pub fn invoke(&self) -> RawOutcome<T> {
        *self.calls.lock() += 1;
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    /// Number of invocations so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_script_replays_in_order_then_falls_back() {
        let op = ScriptedOperation::new(
            vec![RawOutcome::response(503, "a"), RawOutcome::response(502, "b")],
            RawOutcome::response(200, "c"),
        );

        assert_eq!(op.invoke(), RawOutcome::response(503, "a"));
        assert_eq!(op.invoke(), RawOutcome::response(502, "b"));
        assert_eq!(op.invoke(), RawOutcome::response(200, "c"));
        assert_eq!(op.invoke(), RawOutcome::response(200, "c"));
        assert_eq!(op.call_count(), 4);
    }

    #[test]
    fn test_fail_n_times_then_succeeds() {
        let op = ScriptedOperation::fail_n_times(2, RawOutcome::transport("down"), "ok");

        assert_eq!(op.invoke(), RawOutcome::transport("down"));
        assert_eq!(op.invoke(), RawOutcome::transport("down"));
        assert_eq!(op.invoke(), RawOutcome::response(200, "ok"));
    }
}
