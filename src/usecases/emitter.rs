//! Emitter Loop - Bounded Random Counter Emission
//!
//! The core use case: for a fixed wall-clock window, increment the
//! demo counter by a uniformly sampled amount, then pause for a
//! uniformly sampled interval. The loop terminates at the deadline,
//! aborts on cancellation, and refuses to start on an invalid range.
//!
//! Single logical task: the loop suspends only at the sleep step and
//! owns no locks. The counter is externally synchronized; cancellation
//! is observed at the deadline check or the sleep point, never
//! mid-increment.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{debug, info, instrument, warn};

use crate::config::EmitterSettings;
use crate::domain::sampling::{EmptyRange, SampleRange, UniformStream};
use crate::domain::window::RunWindow;
use crate::ports::clock::Clock;
use crate::ports::counter::Counter;

/// Failure taxonomy for an emitter run.
///
/// There is no retry logic anywhere in this taxonomy: a run either
/// completes, is cancelled, or surfaces its fault to the caller.
#[derive(Debug, Error)]
pub enum EmitterError {
    /// Bad ranges or duration; fails before any iteration runs.
    #[error("invalid emitter configuration: {0}")]
    InvalidConfiguration(String),
    /// External interruption observed during suspension.
    #[error("emitter cancelled before the run window closed")]
    Cancelled,
    /// Any other propagated fault; surfaced, never retried.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<EmptyRange> for EmitterError {
    fn from(err: EmptyRange) -> Self {
        Self::InvalidConfiguration(err.to_string())
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Iterations executed (equals the number of increments applied).
    pub iterations: u64,
    /// Sum of all increments applied to the counter.
    pub total_emitted: u64,
    /// Wall-clock time from window open to loop exit.
    pub elapsed: Duration,
}

/// The bounded random-metric emission loop.
///
/// Generic over its collaborators so tests can substitute a mock
/// counter and a deterministic clock.
pub struct EmitterLoop<C: Counter, K: Clock> {
    /// Registry-owned counter handle.
    counter: Arc<C>,
    /// Time source and suspend primitive.
    clock: Arc<K>,
    /// Loop tunables from configuration.
    settings: EmitterSettings,
    /// Shutdown signal receiver.
    shutdown_rx: broadcast::Receiver<()>,
}

impl<C: Counter, K: Clock> EmitterLoop<C, K> {
    /// Create a new emitter loop with explicit collaborators.
    pub fn new(
        counter: Arc<C>,
        clock: Arc<K>,
        settings: EmitterSettings,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            counter,
            clock,
            settings,
            shutdown_rx,
        }
    }

    /// Build the increment and wait streams, validating both ranges.
    ///
    /// With an injected seed the wait stream uses an offset seed so the
    /// two sequences stay independent while remaining reproducible.
    fn streams(&self) -> Result<(UniformStream, UniformStream), EmitterError> {
        let increments = SampleRange::new(
            self.settings.min_increment,
            self.settings.max_increment,
        )?;
        let waits =
            SampleRange::new(self.settings.min_wait_ms, self.settings.max_wait_ms)?;

        Ok(match self.settings.seed {
            Some(seed) => (
                UniformStream::seeded(increments, seed),
                UniformStream::seeded(waits, seed.wrapping_add(1)),
            ),
            None => (
                UniformStream::from_entropy(increments),
                UniformStream::from_entropy(waits),
            ),
        })
    }

    /// Run the loop until the window closes or cancellation arrives.
    ///
    /// # Errors
    /// - [`EmitterError::InvalidConfiguration`] before the first
    ///   iteration when a range is empty or the duration is zero.
    /// - [`EmitterError::Cancelled`] when the shutdown signal is
    ///   observed; no increment is applied after that point.
    #[instrument(skip(self), name = "emitter_loop", fields(counter = %self.counter.name()))]
    pub async fn run(mut self) -> Result<RunReport, EmitterError> {
        if self.settings.duration_seconds == 0 {
            return Err(EmitterError::InvalidConfiguration(
                "duration_seconds must be positive".to_string(),
            ));
        }
        let (mut increments, mut waits) = self.streams()?;

        let window = RunWindow::starting_at(
            self.clock.now(),
            Duration::from_secs(self.settings.duration_seconds),
        );

        info!(
            duration_seconds = self.settings.duration_seconds,
            "Emitter loop started"
        );

        let mut iterations: u64 = 0;
        let mut total_emitted: u64 = 0;

        loop {
            // Cancellation sent while we were not sleeping is honored
            // here, before the next increment.
            match self.shutdown_rx.try_recv() {
                Ok(()) | Err(TryRecvError::Lagged(_)) => {
                    warn!(iterations, "Emitter cancelled at deadline check");
                    return Err(EmitterError::Cancelled);
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => {}
            }

            if !window.is_open(self.clock.now()) {
                break;
            }

            let incr = increments.draw();
            self.counter.increment(incr);
            iterations += 1;
            total_emitted += incr;
            debug!(incr, iterations, "Applied increment");

            let wait = Duration::from_millis(waits.draw());
            tokio::select! {
                biased;
                _ = self.shutdown_rx.recv() => {
                    warn!(iterations, "Emitter cancelled during suspension");
                    return Err(EmitterError::Cancelled);
                }
                _ = self.clock.sleep(wait) => {}
            }
        }

        let report = RunReport {
            iterations,
            total_emitted,
            elapsed: window.elapsed(self.clock.now()),
        };

        info!(
            iterations = report.iterations,
            total_emitted = report.total_emitted,
            elapsed_ms = report.elapsed.as_millis(),
            "Emitter run window closed"
        );

        Ok(report)
    }
}
