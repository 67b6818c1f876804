//! Forma host configuration.
//!
//! TOML-based configuration for the `forma` binary: backend location,
//! streaming endpoints, and logging. All sections use serde defaults so a
//! partial (or missing) file works out of the box. The streaming core never
//! reads this crate; the host injects the resolved values.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use forma_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod env;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use env::{apply_env_overrides, ENV_API_URL, ENV_TOKEN};
pub use schema::{ApiConfig, FormaConfig, LogLevel, LoggingConfig, StreamConfig};

use std::path::Path;

use forma_common::ConfigError;

/// Load config from the platform default path, apply environment
/// overrides, and validate the result.
pub fn load_config() -> Result<FormaConfig, ConfigError> {
    let mut config = toml_loader::load_default()?;
    apply_env_overrides(&mut config);
    validation::validate(&config)?;
    Ok(config)
}

/// Like [`load_config`], but reads an explicit file that must exist.
pub fn load_config_from(path: &Path) -> Result<FormaConfig, ConfigError> {
    let mut config = toml_loader::load_from_path(path)?;
    apply_env_overrides(&mut config);
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to pretty JSON with the bearer token redacted.
pub fn config_to_json(config: &FormaConfig) -> String {
    let mut shown = config.clone();
    if !shown.api.token.is_empty() {
        shown.api.token = "[REDACTED]".into();
    }
    serde_json::to_string_pretty(&shown)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
