//! Validation of URLs submitted for shortening.

use crate::error::AppError;
use serde_json::json;
use url::Url;

/// Trims surrounding whitespace and checks that the input is an absolute
/// `http` or `https` URL with a host and no control characters.
///
/// The URL is returned as submitted (trimmed), not re-serialized, so that the
/// stored value resolves back unchanged.
///
/// # Errors
///
/// Returns [`AppError::Validation`] when the input is empty, unparsable, or
/// uses another scheme.
pub fn validate_original_url(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request("URL must not be empty", json!({})));
    }

    // `Url::parse` drops tabs and newlines, but the stored form must be a
    // valid `Location` header.
    if trimmed.chars().any(char::is_control) {
        return Err(AppError::bad_request(
            "URL must not contain control characters",
            json!({}),
        ));
    }

    let parsed = Url::parse(trimmed).map_err(|e| {
        AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::bad_request(
            "Only http and https URLs can be shortened",
            json!({ "scheme": parsed.scheme() }),
        ));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(AppError::bad_request(
            "URL must contain a host",
            json!({ "url": trimmed }),
        ));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert_eq!(
            validate_original_url("https://example.com/path?q=1").unwrap(),
            "https://example.com/path?q=1"
        );
        assert!(validate_original_url("http://localhost:8080").is_ok());
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(
            validate_original_url("  https://example.com \n").unwrap(),
            "https://example.com"
        );
    }

    #[test]
    fn test_keeps_original_form() {
        assert_eq!(
            validate_original_url("https://EXAMPLE.com").unwrap(),
            "https://EXAMPLE.com"
        );
    }

    #[test]
    fn test_rejects_embedded_control_characters() {
        assert!(validate_original_url("https://example.com/a\nb").is_err());
        assert!(validate_original_url("https://example.com/a\tb").is_err());
        assert!(validate_original_url("https://exa\rmple.com").is_err());
        assert!(validate_original_url("https://example.com/\u{7f}").is_err());
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(validate_original_url("ftp://example.com").is_err());
        assert!(validate_original_url("javascript:alert(1)").is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(validate_original_url("").is_err());
        assert!(validate_original_url("   ").is_err());
        assert!(validate_original_url("not-a-url").is_err());
        assert!(validate_original_url("/relative/path").is_err());
    }
}
