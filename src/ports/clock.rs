//! Clock Port - Time and Suspension Interface
//!
//! Abstracts "what time is it" and "suspend this task" so the emitter
//! can run against the tokio timer in production and a deterministic
//! fake in tests. The loop suspends only through this port.

use std::time::{Duration, Instant};

use async_trait::async_trait;

/// Trait for time sources.
///
/// `sleep` must be cancellation-safe: callers race it against a
/// shutdown signal and drop the future when the signal wins.
#[async_trait]
pub trait Clock: Send + Sync + 'static {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Suspend the current task for `duration`.
    async fn sleep(&self, duration: Duration);
}
