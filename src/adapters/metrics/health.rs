//! Health Check Server - Liveness and Readiness Probes
//!
//! Exposes /live, /ready and /status endpoints via axum 0.7 for Docker
//! health checks and monitoring. Readiness follows the emitter
//! lifecycle: 200 while the loop runs, 503 once shutdown begins or the
//! run window has closed.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tracing::{info, instrument};

use super::prometheus::MetricsRegistry;

/// JSON body returned by the /status endpoint.
#[derive(Debug, Serialize)]
struct StatusBody {
    /// Whether the emitter is still inside its run window.
    ready: bool,
    /// Name of the demo counter.
    counter: String,
    /// Current accumulated counter value.
    value: u64,
}

/// Shared state for the probe handlers.
#[derive(Clone)]
struct ProbeState {
    ready_rx: watch::Receiver<bool>,
    registry: Arc<MetricsRegistry>,
    counter_name: String,
}

/// Axum-based health check HTTP server.
///
/// Serves liveness (/live), readiness (/ready) and a JSON status
/// snapshot (/status) for orchestrator probes and manual inspection.
pub struct HealthServer {
    ready_rx: watch::Receiver<bool>,
    registry: Arc<MetricsRegistry>,
    counter_name: String,
    bind_address: String,
}

impl HealthServer {
    /// Create a new health server.
    pub fn new(
        ready_rx: watch::Receiver<bool>,
        registry: Arc<MetricsRegistry>,
        counter_name: impl Into<String>,
        bind_address: impl Into<String>,
    ) -> Self {
        Self {
            ready_rx,
            registry,
            counter_name: counter_name.into(),
            bind_address: bind_address.into(),
        }
    }

    /// Start the health check server.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(
        self,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let state = ProbeState {
            ready_rx: self.ready_rx,
            registry: Arc::clone(&self.registry),
            counter_name: self.counter_name,
        };

        let app = Router::new()
            .route("/live", get(Self::liveness))
            .route("/ready", get(Self::readiness))
            .route("/status", get(Self::status))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind(&self.bind_address).await?;

        info!(address = %self.bind_address, "Health server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }

    /// Liveness probe: always returns 200 if the process is running.
    async fn liveness() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    /// Readiness probe: returns 200 only while the emitter is running.
    async fn readiness(State(state): State<ProbeState>) -> impl IntoResponse {
        if *state.ready_rx.borrow() {
            (StatusCode::OK, "READY")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        }
    }

    /// Status snapshot: emitter state plus the demo counter value.
    async fn status(State(state): State<ProbeState>) -> impl IntoResponse {
        Json(StatusBody {
            ready: *state.ready_rx.borrow(),
            counter: state.counter_name.clone(),
            value: state.registry.demo_counter_value(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_body_shape() {
        let body = StatusBody {
            ready: true,
            counter: "myapp_metric1".to_string(),
            value: 42,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["ready"], true);
        assert_eq!(json["counter"], "myapp_metric1");
        assert_eq!(json["value"], 42);
    }
}
