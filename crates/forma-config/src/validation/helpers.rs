//! Shared validation helpers.

/// Push an error if `value` is outside `[min, max]`.
pub(crate) fn validate_range(errors: &mut Vec<String>, name: &str, value: u32, min: u32, max: u32) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

/// Push an error unless `value` is an absolute http(s) URL without a trailing slash.
pub(crate) fn validate_url(errors: &mut Vec<String>, name: &str, value: &str) {
    let Some(rest) = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"))
    else {
        errors.push(format!("{name} = {value:?} must start with http:// or https://"));
        return;
    };
    if rest.is_empty() {
        errors.push(format!("{name} = {value:?} has no host"));
    } else if value.ends_with('/') {
        errors.push(format!("{name} = {value:?} must not end with '/'"));
    }
}

/// Push an error unless `value` is an absolute URL path.
pub(crate) fn validate_path(errors: &mut Vec<String>, name: &str, value: &str) {
    if !value.starts_with('/') {
        errors.push(format!("{name} = {value:?} must start with '/'"));
    }
}
