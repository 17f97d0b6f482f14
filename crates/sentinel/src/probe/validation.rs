//! Validation of probe targets before any request is made.

use anyhow::Result;
use url::Url;

/// Validate URL format and scheme
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url)?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(anyhow::anyhow!("Unsupported URL scheme: {}", parsed.scheme())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_and_https_accepted() {
        assert!(validate_url("http://example.com").is_ok());
        assert!(validate_url("https://example.com/health?x=1").is_ok());
    }

    #[test]
    fn test_other_schemes_rejected() {
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("file:///etc/passwd").is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("").is_err());
    }
}
