//! Building the public short URL returned to clients.

use crate::error::AppError;
use axum::http::{HeaderMap, header};
use serde_json::json;

/// Path prefix under which redirects are served.
pub const REDIRECT_PREFIX: &str = "/r/";

/// Builds `<base>/r/<id>`.
///
/// When `public_base_url` is configured it is used verbatim (trailing slash
/// trimmed). Otherwise the base is derived from the request: the `Host`
/// header (port included) and `https` if `X-Forwarded-Proto` says so,
/// `http` otherwise.
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] if no base URL is configured and the
/// `Host` header is missing or not valid UTF-8.
pub fn build_short_url(
    public_base_url: Option<&str>,
    headers: &HeaderMap,
    id: &str,
) -> Result<String, AppError> {
    if let Some(base) = public_base_url {
        return Ok(format!(
            "{}{}{}",
            base.trim_end_matches('/'),
            REDIRECT_PREFIX,
            id
        ));
    }

    let host = headers
        .get(header::HOST)
        .ok_or_else(|| AppError::invalid_input("Missing Host header", json!({})))?
        .to_str()
        .map_err(|_| AppError::invalid_input("Invalid Host header", json!({})))?;

    let is_tls = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("https"));

    let scheme = if is_tls { "https" } else { "http" };

    Ok(format!("{scheme}://{host}{REDIRECT_PREFIX}{id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_host(host: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static(host));
        headers
    }

    #[test]
    fn test_http_from_host() {
        let headers = headers_with_host("sho.rt");
        assert_eq!(
            build_short_url(None, &headers, "1q2w3e4").unwrap(),
            "http://sho.rt/r/1q2w3e4"
        );
    }

    #[test]
    fn test_https_from_forwarded_proto() {
        let mut headers = headers_with_host("sho.rt");
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(
            build_short_url(None, &headers, "1q2w3e4").unwrap(),
            "https://sho.rt/r/1q2w3e4"
        );
    }

    #[test]
    fn test_host_port_is_kept() {
        let headers = headers_with_host("localhost:3000");
        assert_eq!(
            build_short_url(None, &headers, "abc").unwrap(),
            "http://localhost:3000/r/abc"
        );
    }

    #[test]
    fn test_configured_base_wins() {
        let headers = headers_with_host("internal:3000");
        assert_eq!(
            build_short_url(Some("https://sho.rt/"), &headers, "abc").unwrap(),
            "https://sho.rt/r/abc"
        );
    }

    #[test]
    fn test_missing_host() {
        let err = build_short_url(None, &HeaderMap::new(), "abc").unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { .. }));
    }
}
