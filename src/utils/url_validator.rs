//! Syntactic URL validation applied at the API boundary.

use crate::error::AppError;
use serde_json::json;
use url::Url;

/// Maximum accepted length of a target URL, in characters.
pub const MAX_URL_LENGTH: usize = 2048;

/// Validates a target URL before any record is created or updated.
///
/// # Rules
///
/// - At most [`MAX_URL_LENGTH`] characters
/// - No control characters and no leading or trailing whitespace, since the
///   raw string is what gets stored and redirected to
/// - Parses as an absolute URL
/// - Non-empty scheme and host
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] if any rule is violated.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_url("https://example.com/path").is_ok());
/// assert!(validate_url("example.com").is_err());      // no scheme
/// assert!(validate_url("mailto:a@b.c").is_err());     // no host
/// ```
pub fn validate_url(raw: &str) -> Result<(), AppError> {
    let length = raw.chars().count();
    if length > MAX_URL_LENGTH {
        return Err(AppError::invalid_input(
            format!("URL cannot be longer than {MAX_URL_LENGTH} characters"),
            json!({ "length": length }),
        ));
    }

    if raw.trim() != raw || raw.chars().any(char::is_control) {
        return Err(AppError::invalid_input(
            "URL does not have a valid format",
            json!({ "reason": "control characters or surrounding whitespace" }),
        ));
    }

    let parsed = Url::parse(raw).map_err(|e| {
        AppError::invalid_input(
            "URL does not have a valid format",
            json!({ "reason": e.to_string() }),
        )
    })?;

    let has_host = parsed.host_str().is_some_and(|h| !h.is_empty());
    if parsed.scheme().is_empty() || !has_host {
        return Err(AppError::invalid_input(
            "URL does not have a valid format",
            json!({ "reason": "scheme and host are required" }),
        ));
    }

    Ok(())
}
