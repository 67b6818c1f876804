//! Environment variable overrides.

use tracing::debug;

use crate::schema::FormaConfig;

/// Overrides `api.base_url`.
pub const ENV_API_URL: &str = "FORMA_API_URL";
/// Overrides `api.token`.
pub const ENV_TOKEN: &str = "FORMA_TOKEN";

/// Apply `FORMA_API_URL` / `FORMA_TOKEN` from the process environment.
pub fn apply_env_overrides(config: &mut FormaConfig) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

pub(crate) fn apply_overrides_from(
    config: &mut FormaConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        debug!("api.base_url overridden by {ENV_API_URL}");
        config.api.base_url = url.trim().trim_end_matches('/').to_string();
    }
    if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.trim().is_empty()) {
        debug!("api.token overridden by {ENV_TOKEN}");
        config.api.token = token.trim().to_string();
    }
}
