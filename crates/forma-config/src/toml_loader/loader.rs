//! Reading `config.toml`, creating it on first run.

use std::io::ErrorKind;
use std::path::Path;

use forma_common::ConfigError;
use tracing::info;

use super::paths::{create_default_config, default_config_path};
use crate::schema::FormaConfig;

/// Parse the TOML file at `path`. Missing sections and fields take their
/// serde defaults; range checks are left to [`crate::validation`].
pub fn load_from_path(path: &Path) -> Result<FormaConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => {
            return Err(ConfigError::ParseError(format!(
                "cannot read {}: {e}",
                path.display()
            )))
        }
    };

    let config = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;
    info!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Load `path`, writing the commented template there first if it is absent.
pub fn load_or_create(path: &Path) -> Result<FormaConfig, ConfigError> {
    match load_from_path(path) {
        Err(ConfigError::FileNotFound(_)) => {
            create_default_config(path)?;
            Ok(FormaConfig::default())
        }
        loaded => loaded,
    }
}

/// [`load_or_create`] at the per-user default location
/// (`~/.config/forma/config.toml` on Linux,
/// `~/Library/Application Support/forma/config.toml` on macOS).
pub fn load_default() -> Result<FormaConfig, ConfigError> {
    load_or_create(&default_config_path()?)
}
