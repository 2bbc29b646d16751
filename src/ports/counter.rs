//! Counter Port - Monotonic Metric Accumulator Interface
//!
//! The emitter only ever adds non-negative amounts to a counter owned
//! by an external metrics registry. The registry is responsible for
//! internal synchronization; increments may race with reads from other
//! tasks (scrapes, status probes).

/// Trait for named, monotonically increasing counters.
///
/// Implementors wrap a registry-owned accumulator. The handle is
/// created once at bootstrap and lives for the process lifetime.
pub trait Counter: Send + Sync + 'static {
    /// Add a non-negative amount to the counter.
    fn increment(&self, amount: u64);

    /// Current accumulated value.
    fn value(&self) -> u64;

    /// Stable metric name (e.g. `myapp_metric1`).
    fn name(&self) -> &str;
}
