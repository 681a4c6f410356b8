//! HTTP entry point and process wiring for quotereel.

pub mod api;
pub mod metrics;
pub mod state;

use std::path::PathBuf;

use anyhow::{Context, Result};
use quotereel_core::{load_config, validate_config, Config};
use tracing::info;

pub use api::create_router;
pub use state::AppState;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "QUOTEREEL_CONFIG";

/// Configuration file read when [`CONFIG_ENV_VAR`] is unset.
pub const DEFAULT_CONFIG_FILE: &str = "quotereel.toml";

/// Resolve the configuration file to read.
///
/// An explicit `QUOTEREEL_CONFIG` must exist; the default file is optional.
pub fn config_path() -> Option<PathBuf> {
    match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
        _ => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        }
    }
}

/// Read `.env`, load the configuration and validate it.
pub fn load_settings() -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded environment from {:?}", path);
    }

    let path = config_path();
    match &path {
        Some(path) => info!("Loading configuration from {:?}", path),
        None => info!("No configuration file, using defaults and environment"),
    }

    let config = load_config(path.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", path))?;
    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}
