//! Prometheus Metrics Registry - Emitter Observability
//!
//! Registers and exposes Prometheus metrics for the emitter demo.
//! The registry owns the synthetic demo counter the loop perturbs,
//! plus ambient loop metrics, and serves the scrape endpoint.
//! Aggregation and export beyond the scrape surface are the backend's
//! job, not this process's.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, Opts, Registry, TextEncoder,
};
use tokio::sync::broadcast;
use tracing::{info, instrument};

use crate::ports::counter::Counter;

/// Centralized Prometheus metrics for the emitter.
///
/// Ambient metrics follow the naming convention `metric_pulse_*`; the
/// demo counter keeps the externally stable name from configuration.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// The synthetic counter the emitter loop increments.
    demo_counter: IntCounter,
    /// Loop iterations executed.
    iterations: IntCounter,
    /// Distribution of sampled increment amounts.
    increment_size: Histogram,
    /// Stable name of the demo counter.
    counter_name: String,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    ///
    /// # Errors
    /// Returns error if `counter_name` is not a valid Prometheus metric
    /// name or a metric is registered twice.
    pub fn new(counter_name: &str) -> anyhow::Result<Self> {
        let registry = Registry::new();

        let demo_counter = IntCounter::with_opts(Opts::new(
            counter_name,
            "Synthetic demo counter perturbed by the emitter loop",
        ))?;

        let iterations = IntCounter::with_opts(Opts::new(
            "metric_pulse_emitter_iterations_total",
            "Total emitter loop iterations executed",
        ))?;

        let increment_size = Histogram::with_opts(
            HistogramOpts::new(
                "metric_pulse_increment_size",
                "Sampled increment amounts applied to the demo counter",
            )
            .buckets(vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 75.0, 100.0]),
        )?;

        // Register all metrics
        registry.register(Box::new(demo_counter.clone()))?;
        registry.register(Box::new(iterations.clone()))?;
        registry.register(Box::new(increment_size.clone()))?;

        Ok(Self {
            registry,
            demo_counter,
            iterations,
            increment_size,
            counter_name: counter_name.to_string(),
        })
    }

    /// Port-level handle to the registry-owned demo counter.
    ///
    /// The handle is cheap to clone into the emitter task; the
    /// underlying Prometheus primitives are atomically shared.
    pub fn counter_handle(&self) -> EmitterCounter {
        EmitterCounter {
            name: self.counter_name.clone(),
            counter: self.demo_counter.clone(),
            iterations: self.iterations.clone(),
            increment_size: self.increment_size.clone(),
        }
    }

    /// Current value of the demo counter (used by status probes).
    pub fn demo_counter_value(&self) -> u64 {
        self.demo_counter.get()
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let registry = metrics_self.registry.clone();
                async move {
                    let encoder = TextEncoder::new();
                    let metric_families = registry.gather();
                    let mut buffer = Vec::new();
                    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
                        tracing::warn!(error = %e, "Failed to encode metrics");
                    }
                    String::from_utf8(buffer).unwrap_or_default()
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}

/// [`Counter`] port implementation backed by the Prometheus registry.
///
/// Every increment also bumps the iteration counter and records the
/// amount in the size histogram, so one handle keeps the ambient loop
/// metrics consistent with the demo counter.
#[derive(Clone)]
pub struct EmitterCounter {
    name: String,
    counter: IntCounter,
    iterations: IntCounter,
    increment_size: Histogram,
}

impl Counter for EmitterCounter {
    fn increment(&self, amount: u64) {
        self.counter.inc_by(amount);
        self.iterations.inc();
        #[allow(clippy::cast_precision_loss)]
        self.increment_size.observe(amount as f64);
    }

    fn value(&self) -> u64 {
        self.counter.get()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_handle_accumulates() {
        let registry = MetricsRegistry::new("test_metric1").unwrap();
        let handle = registry.counter_handle();

        handle.increment(3);
        handle.increment(7);

        assert_eq!(handle.value(), 10);
        assert_eq!(registry.demo_counter_value(), 10);
        assert_eq!(handle.name(), "test_metric1");
    }

    #[test]
    fn test_invalid_metric_name_rejected() {
        assert!(MetricsRegistry::new("myapp.metric1 with spaces").is_err());
    }
}
