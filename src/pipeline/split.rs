//! Response header/body separation.
//!
//! # Responsibilities
//! - Turn the final response's header map into ordered (name, value) pairs
//! - Filter those pairs down to the native-mode allow-list
//!
//! # Design Decisions
//! - The HTTP client already hands us the final response of a redirect chain
//!   with headers and body separated, so no textual blank-line heuristic is
//!   needed; a headerless response is simply an empty pair list
//! - Wire order and duplicate names (e.g. several `Set-Cookie`) are preserved
//! - Native mode forwards only headers that are safe to replay verbatim

use reqwest::header::HeaderMap;

/// Headers forwarded onto the client response in native mode.
const NATIVE_FORWARDED: &[&str] = &["content-type", "content-language", "set-cookie"];

/// Flatten a header map into (name, value) string pairs in wire order.
///
/// Values that are not valid UTF-8 are replaced lossily rather than dropped.
pub fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

/// Keep only the allow-listed headers, matched case-insensitively.
pub fn native_headers(pairs: &[(String, String)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .filter(|(name, _)| {
            NATIVE_FORWARDED
                .iter()
                .any(|allowed| name.eq_ignore_ascii_case(allowed))
        })
        .cloned()
        .collect()
}
