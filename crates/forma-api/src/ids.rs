//! Normalization of prefixed front-end ids to backend numeric ids.

use std::sync::LazyLock;

use regex::Regex;

use crate::ApiError;

static SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_(\d+)$").unwrap());

/// `"module_10"` → `10`, `"lesson_27"` → `27`, `"42"` → `42`.
///
/// Ids minted client-side for unsaved items (`"new_3"`) also match the
/// suffix rule; callers must not send those to update endpoints.
pub fn to_numeric_id(id: &str) -> Result<u64, ApiError> {
    let digits = SUFFIX_RE
        .captures(id)
        .and_then(|caps| caps.get(1))
        .map_or(id.trim(), |m| m.as_str());
    digits
        .parse()
        .map_err(|_| ApiError::InvalidId(id.to_string()))
}
