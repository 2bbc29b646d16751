//! Metric Pulse — Entry Point
//!
//! Initializes configuration, logging, the metrics registry and the
//! bounded emitter loop. Runs until the emitter's window closes or
//! SIGINT arrives.
//!
//! Wiring sequence:
//! 1. Load config.toml (defaults when absent, DD_API_KEY override)
//! 2. Init tracing (JSON structured logging)
//! 3. Log the export diagnostics (API key masked, step verbatim)
//! 4. Create shutdown broadcast + readiness watch channels
//! 5. Build the Prometheus registry and the demo counter handle
//! 6. Spawn metrics server (/metrics)
//! 7. Spawn health server (/live, /ready, /status)
//! 8. Spawn the emitter loop with explicit Counter + Clock arguments
//! 9. Wait for completion or SIGINT → graceful shutdown (flip
//!    readiness → broadcast → drain → exit)

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::{broadcast, watch};
use tracing::{error, info, warn};
use uuid::Uuid;

mod adapters;
mod config;
mod domain;
mod ports;
mod usecases;

use adapters::metrics::{HealthServer, MetricsRegistry};
use adapters::time::TokioClock;
use ports::counter::Counter;
use usecases::emitter::{EmitterError, EmitterLoop};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config = config::loader::load_config("config.toml")
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.app.log_level)
                }),
        )
        .json()
        .init();

    let run_id = Uuid::new_v4();
    info!(
        name = %config.app.name,
        version = env!("CARGO_PKG_VERSION"),
        run_id = %run_id,
        counter = %config.emitter.counter_name,
        duration_seconds = config.emitter.duration_seconds,
        "Starting metric-pulse"
    );

    // ── 3. Export diagnostics: logged, never parsed or validated ──
    info!(
        api_key = %config.export.masked_api_key(),
        step = %config.export.step,
        "Telemetry export settings"
    );

    // ── 4. Shutdown + readiness channels ────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let (ready_tx, ready_rx) = watch::channel(true);

    // ── 5. Metrics registry + demo counter handle ───────────
    let registry = Arc::new(
        MetricsRegistry::new(&config.emitter.counter_name)
            .context("Failed to build metrics registry")?,
    );
    let counter = Arc::new(registry.counter_handle());
    let clock = Arc::new(TokioClock::new());

    // ── 6. Spawn Prometheus metrics server ──────────────────
    let metrics_handle = if config.metrics.enabled {
        let server_registry = Arc::clone(&registry);
        let server_shutdown = shutdown_tx.subscribe();
        let bind_address = config.metrics.bind_address.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = server_registry.serve(bind_address, server_shutdown).await {
                error!(error = %e, "Metrics server failed");
            }
        }))
    } else {
        None
    };

    // ── 7. Spawn health server ──────────────────────────────
    let health = HealthServer::new(
        ready_rx,
        Arc::clone(&registry),
        config.emitter.counter_name.clone(),
        config.metrics.health_address.clone(),
    );
    let health_shutdown = shutdown_tx.subscribe();
    let health_handle = tokio::spawn(async move {
        if let Err(e) = health.run(health_shutdown).await {
            error!(error = %e, "Health server failed");
        }
    });

    // ── 8. Spawn the emitter loop ───────────────────────────
    let emitter = EmitterLoop::new(
        Arc::clone(&counter),
        Arc::clone(&clock),
        config.emitter.clone(),
        shutdown_tx.subscribe(),
    );
    let mut emitter_handle = tokio::spawn(emitter.run());

    info!("All tasks spawned — emitter is running");

    // ── 9. Wait for completion or SIGINT ────────────────────
    let outcome = tokio::select! {
        res = &mut emitter_handle => Some(res),
        _ = signal::ctrl_c() => {
            info!("SIGINT received, initiating graceful shutdown");
            None
        }
    };

    // ── Graceful shutdown (flip readiness → broadcast → drain) ──
    let _ = ready_tx.send(false);
    let _ = shutdown_tx.send(());

    let join_result = match outcome {
        Some(res) => res,
        None => tokio::time::timeout(Duration::from_secs(5), emitter_handle)
            .await
            .context("Emitter did not stop after shutdown signal")?,
    };
    let emitter_result = join_result.context("Emitter task panicked")?;

    // Let the HTTP servers finish their graceful shutdown (up to 5s)
    if let Some(handle) = metrics_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }
    let _ = tokio::time::timeout(Duration::from_secs(5), health_handle).await;

    match emitter_result {
        Ok(report) => info!(
            iterations = report.iterations,
            total_emitted = report.total_emitted,
            elapsed_ms = report.elapsed.as_millis(),
            final_value = counter.value(),
            "Emitter completed"
        ),
        Err(EmitterError::Cancelled) => {
            warn!(final_value = counter.value(), "Emitter cancelled before the window closed");
        }
        Err(e) => {
            error!(error = %e, "Emitter failed");
            return Err(e.into());
        }
    }

    info!("Shutdown complete");
    Ok(())
}
