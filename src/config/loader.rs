//! Configuration Loader - File Loading and Env Overrides
//!
//! Handles loading `config.toml`, falling back to defaults when the
//! file is absent, and applying the `DD_API_KEY` environment override
//! for the export API key.
//!
//! Range sanity for the emitter is deliberately NOT checked here: the
//! emitter validates its own ranges before the first iteration and
//! fails with a typed error, so a bad range reaches the caller as an
//! `InvalidConfiguration` rather than a load failure.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::AppConfig;

/// Load configuration from a TOML file.
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Errors
/// Returns detailed error if the file exists but can't be read or
/// fails to parse. A missing file is not an error: the demo runs on
/// defaults.
pub fn load_config(path: &str) -> Result<AppConfig> {
    let path = Path::new(path);

    let mut config: AppConfig = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content).with_context(|| "Failed to parse config.toml")?
    } else {
        warn!(
            path = %path.display(),
            "Config file not found, falling back to defaults"
        );
        AppConfig::default()
    };

    // DD_API_KEY from the environment wins over the file value.
    if let Ok(api_key) = std::env::var("DD_API_KEY") {
        if !api_key.is_empty() {
            config.export.api_key = api_key;
        }
    }

    let increment_range = format!(
        "[{}, {})",
        config.emitter.min_increment, config.emitter.max_increment
    );
    let wait_range_ms = format!(
        "[{}, {})",
        config.emitter.min_wait_ms, config.emitter.max_wait_ms
    );
    info!(
        counter = %config.emitter.counter_name,
        duration_seconds = config.emitter.duration_seconds,
        increment_range = %increment_range,
        wait_range_ms = %wait_range_ms,
        "Configuration loaded successfully"
    );

    Ok(config)
}
