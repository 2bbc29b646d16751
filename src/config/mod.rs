//! Configuration Module - TOML-based Emitter Configuration
//!
//! Loads configuration from `config.toml` with an environment variable
//! override for the export API key. All tunables are externalized here -
//! nothing is hardcoded in the domain layer. The export section is
//! diagnostic-only: its values are logged at startup and handed to the
//! external telemetry backend as-is, never parsed or validated.

pub mod loader;

use serde::Deserialize;

/// Top-level application configuration.
///
/// Loaded from `config.toml` at startup; every section falls back to
/// defaults when absent so the demo runs without a config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Application identity and logging.
    #[serde(default)]
    pub app: AppSettings,
    /// Emitter loop tunables.
    #[serde(default)]
    pub emitter: EmitterSettings,
    /// Diagnostic export settings for the telemetry backend.
    #[serde(default)]
    pub export: ExportSettings,
    /// Metrics and health endpoints.
    #[serde(default)]
    pub metrics: MetricsSettings,
}

/// Application identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    /// Human-readable application name.
    #[serde(default = "default_app_name")]
    pub name: String,
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

/// Emitter loop configuration.
///
/// Ranges are half-open `[min, max)`. They are validated by the
/// emitter itself before the first iteration, not here.
#[derive(Debug, Clone, Deserialize)]
pub struct EmitterSettings {
    /// Stable name of the demo counter.
    #[serde(default = "default_counter_name")]
    pub counter_name: String,
    /// Total run duration in seconds.
    #[serde(default = "default_duration_seconds")]
    pub duration_seconds: u64,
    /// Smallest increment applied per iteration (inclusive).
    #[serde(default = "default_min_increment")]
    pub min_increment: u64,
    /// Upper bound on increments (exclusive).
    #[serde(default = "default_max_increment")]
    pub max_increment: u64,
    /// Shortest pause between iterations in milliseconds (inclusive).
    #[serde(default = "default_min_wait_ms")]
    pub min_wait_ms: u64,
    /// Upper bound on pauses in milliseconds (exclusive).
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
    /// Fixed RNG seed. Leave unset for non-reproducible runs.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for EmitterSettings {
    fn default() -> Self {
        Self {
            counter_name: default_counter_name(),
            duration_seconds: default_duration_seconds(),
            min_increment: default_min_increment(),
            max_increment: default_max_increment(),
            min_wait_ms: default_min_wait_ms(),
            max_wait_ms: default_max_wait_ms(),
            seed: None,
        }
    }
}

/// Diagnostic export settings.
///
/// Two opaque strings the external backend cares about. Logged at
/// startup (API key masked) and otherwise untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportSettings {
    /// Backend API key. Overridden by `DD_API_KEY` when set.
    #[serde(default)]
    pub api_key: String,
    /// Export step interval as the backend expects it (e.g. "10s").
    #[serde(default = "default_step")]
    pub step: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            step: default_step(),
        }
    }
}

impl ExportSettings {
    /// API key safe for logs: all but the last four characters masked.
    pub fn masked_api_key(&self) -> String {
        if self.api_key.is_empty() {
            return "<unset>".to_string();
        }
        if self.api_key.len() <= 4 {
            return "****".to_string();
        }
        let tail = self.api_key.get(self.api_key.len() - 4..).unwrap_or("");
        format!("****{tail}")
    }
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// Enable the Prometheus scrape endpoint.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Metrics server bind address.
    #[serde(default = "default_metrics_addr")]
    pub bind_address: String,
    /// Health server bind address.
    #[serde(default = "default_health_addr")]
    pub health_address: String,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            bind_address: default_metrics_addr(),
            health_address: default_health_addr(),
        }
    }
}

// Default value functions for serde

fn default_app_name() -> String {
    "metric-pulse".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_counter_name() -> String {
    "myapp_metric1".to_string()
}

fn default_duration_seconds() -> u64 {
    120
}

fn default_min_increment() -> u64 {
    1
}

fn default_max_increment() -> u64 {
    100
}

fn default_min_wait_ms() -> u64 {
    10
}

fn default_max_wait_ms() -> u64 {
    100
}

fn default_step() -> String {
    "10s".to_string()
}

fn default_true() -> bool {
    true
}

fn default_metrics_addr() -> String {
    "0.0.0.0:9090".to_string()
}

fn default_health_addr() -> String {
    "0.0.0.0:8080".to_string()
}
