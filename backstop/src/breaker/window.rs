//! Rolling, time-bounded sample window.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// One completed attempt folded into the breaker's statistics.
#[derive(Debug, Clone, Copy)]
struct Sample {
    recorded_at: Instant,
    countable: bool,
}

/// Trailing time interval of recent samples.
///
/// Samples older than the window span are evicted lazily on every read and
/// write. The window is bounded by time, never by count, so bursty load
/// widens the sample set instead of silently shortening the interval.
#[derive(Debug)]
pub(super) struct SampleWindow {
    samples: VecDeque<Sample>,
    span: Duration,
}

impl SampleWindow {
    pub(super) fn new(span: Duration) -> Self {
        Self {
            samples: VecDeque::new(),
            span,
        }
    }

    /// Appends one sample, evicting expired ones first.
    pub(super) fn push(&mut self, now: Instant, countable: bool) {
        self.evict(now);
        self.samples.push_back(Sample {
            recorded_at: now,
            countable,
        });
    }

    /// Evicts samples, then returns the sample count and countable-failure
    /// ratio over what remains.
    pub(super) fn snapshot(&mut self, now: Instant) -> (usize, f64) {
        self.evict(now);
        let total = self.samples.len();
        if total == 0 {
            return (0, 0.0);
        }
        let failures = self.samples.iter().filter(|s| s.countable).count();
        (total, failures as f64 / total as f64)
    }

    pub(super) fn clear(&mut self) {
        self.samples.clear();
    }

    fn evict(&mut self, now: Instant) {
        while let Some(front) = self.samples.front() {
            if now.duration_since(front.recorded_at) >= self.span {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }
}
