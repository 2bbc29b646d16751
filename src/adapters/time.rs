//! Tokio Clock Adapter
//!
//! Production implementation of the `Clock` port: wall time from
//! `std::time::Instant`, suspension from the tokio timer. Tests use a
//! deterministic fake instead, so the emitter never sleeps for real in
//! the test suite.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::ports::clock::Clock;

/// Tokio-backed clock for production wiring.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl TokioClock {
    /// Create a new tokio clock.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
