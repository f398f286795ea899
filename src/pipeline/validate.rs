//! Target URL validation.
//!
//! # Responsibilities
//! - Reject absent/empty targets (`MissingTarget`)
//! - Reject targets that are not http(s) URLs ending in `.json`
//!   (`InvalidTarget`)
//!
//! # Design Decisions
//! - The `.json` restriction limits the proxy to JSON-resource fetching; it
//!   is a scoping rule, not a security boundary
//! - Only the URL path is inspected, so query strings are allowed
//! - Pure function, no side effects

use url::Url;

use crate::pipeline::types::ProxyError;

/// Validate the `url` directive and parse it.
pub fn validate_target(raw: Option<&str>) -> Result<Url, ProxyError> {
    let raw = match raw {
        Some(r) if !r.is_empty() => r,
        _ => return Err(ProxyError::MissingTarget),
    };

    let parsed = Url::parse(raw).map_err(|_| ProxyError::InvalidTarget)?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ProxyError::InvalidTarget);
    }

    if !parsed.path().ends_with(".json") {
        return Err(ProxyError::InvalidTarget);
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_target() {
        assert_eq!(validate_target(None), Err(ProxyError::MissingTarget));
        assert_eq!(validate_target(Some("")), Err(ProxyError::MissingTarget));
    }

    #[test]
    fn test_unparseable_url() {
        assert_eq!(
            validate_target(Some("not a url")),
            Err(ProxyError::InvalidTarget)
        );
    }

    #[test]
    fn test_rejects_non_http_schemes() {
        assert_eq!(
            validate_target(Some("ftp://example.com/data.json")),
            Err(ProxyError::InvalidTarget)
        );
        assert_eq!(
            validate_target(Some("file:///etc/data.json")),
            Err(ProxyError::InvalidTarget)
        );
    }

    #[test]
    fn test_rejects_non_json_paths() {
        assert_eq!(
            validate_target(Some("http://example.com/page.html")),
            Err(ProxyError::InvalidTarget)
        );
        assert_eq!(
            validate_target(Some("http://example.com/")),
            Err(ProxyError::InvalidTarget)
        );
        // ".json" in the query string does not count.
        assert_eq!(
            validate_target(Some("http://example.com/data?file=x.json")),
            Err(ProxyError::InvalidTarget)
        );
    }

    #[test]
    fn test_accepts_json_targets() {
        let url = validate_target(Some("http://example.com/data.json")).unwrap();
        assert_eq!(url.path(), "/data.json");

        // Query strings are fine as long as the path ends in .json.
        let url = validate_target(Some("https://example.com/api/v2/feed.json?page=2")).unwrap();
        assert_eq!(url.query(), Some("page=2"));
    }
}
