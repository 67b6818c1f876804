//! Full configuration validation.
//!
//! Each check pushes a message into a shared list so every problem is
//! reported at once in a single `ConfigError`.

mod helpers;


use crate::schema::FormaConfig;
use forma_common::ConfigError;
use helpers::{validate_path, validate_range, validate_url};

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &FormaConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_url(&mut errors, "api.base_url", &config.api.base_url);
    validate_path(&mut errors, "stream.content_path", &config.stream.content_path);
    validate_path(&mut errors, "stream.agent_path", &config.stream.agent_path);
    validate_range(
        &mut errors,
        "stream.connect_timeout_secs",
        config.stream.connect_timeout_secs,
        1,
        120,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
