//! Run-window arithmetic for the bounded emission loop.
//!
//! The window `[start, start + duration)` is computed once at loop entry
//! and never mutated. The loop asks `is_open` before every iteration; an
//! in-flight sleep may overshoot the deadline by at most one sampled wait.

use std::time::{Duration, Instant};

/// Immutable wall-clock interval `[start, start + duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunWindow {
    start: Instant,
    deadline: Instant,
}

impl RunWindow {
    /// Compute the window from a start instant and a duration.
    pub fn starting_at(start: Instant, duration: Duration) -> Self {
        Self {
            start,
            deadline: start + duration,
        }
    }

    /// Instant the window opened.
    pub fn start(&self) -> Instant {
        self.start
    }

    /// First instant at which no new iteration may begin.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Whether a new iteration may still start at `now`.
    pub fn is_open(&self, now: Instant) -> bool {
        now < self.deadline
    }

    /// Time left until the deadline (zero once past it).
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    /// Time elapsed since the window opened.
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start)
    }
}
