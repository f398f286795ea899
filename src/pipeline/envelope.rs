//! JSON envelope construction.
//!
//! # Responsibilities
//! - Build the `contents` / `status` / optional `headers` object that gets
//!   serialized for enveloped responses
//!
//! # Design Decisions
//! - `headers` is keyed by name with the last occurrence winning, mirroring
//!   wire order of the final response
//! - `status` is always present: the full transport record under
//!   `full_status`, otherwise just `http_code`
//! - Body decoding distinguishes "parse failed" from "parsed to a falsy
//!   value": `0`, `false`, `null` and `""` are valid JSON and are used as
//!   the parsed value rather than falling back to the raw string
//! - Serialization to text is the HTTP layer's job; this module ends at the
//!   in-memory `serde_json::Value`

use serde_json::{Map, Value};

use crate::pipeline::types::{FetchOutcome, MinimalStatus, RequestContext};

/// Compose the envelope for one fetch outcome.
pub fn build(outcome: &FetchOutcome, ctx: &RequestContext) -> Value {
    let mut data = Map::new();

    if ctx.full_headers {
        let mut headers = Map::new();
        for (name, value) in &outcome.headers {
            // Map insertion: a later duplicate overwrites the earlier one.
            headers.insert(name.clone(), Value::String(value.clone()));
        }
        data.insert("headers".to_string(), Value::Object(headers));
    }

    let status = if ctx.full_status {
        serde_json::to_value(&outcome.status)
    } else {
        serde_json::to_value(MinimalStatus(&outcome.status))
    };
    // Status serialization cannot fail for these types; degrade to the
    // uniform error shape rather than panicking if it ever does.
    data.insert(
        "status".to_string(),
        status.unwrap_or_else(|_| serde_json::json!({ "http_code": "ERROR" })),
    );

    let body_text = String::from_utf8_lossy(&outcome.body);
    let contents = match serde_json::from_str::<Value>(&body_text) {
        Ok(parsed) => parsed,
        Err(_) => Value::String(body_text.into_owned()),
    };
    data.insert("contents".to_string(), contents);

    Value::Object(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{HttpCode, TransportDiagnostics, TransportStatus};
    use axum::body::Bytes;

    fn outcome(body: &str) -> FetchOutcome {
        FetchOutcome {
            headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("set-cookie".to_string(), "a=1".to_string()),
                ("set-cookie".to_string(), "b=2".to_string()),
            ],
            body: Bytes::from(body.to_string()),
            status: TransportStatus {
                http_code: HttpCode::Code(200),
                diagnostics: Some(TransportDiagnostics {
                    url: "http://example.com/data.json".into(),
                    content_type: Some("application/json".into()),
                    size_download: body.len() as u64,
                    total_time_ms: 5,
                    remote_addr: None,
                }),
            },
        }
    }

    #[test]
    fn test_minimal_envelope_shape() {
        let ctx = RequestContext::default();
        let value = build(&outcome(r#"{"a":1}"#), &ctx);

        assert_eq!(
            value,
            serde_json::json!({
                "status": { "http_code": 200 },
                "contents": { "a": 1 }
            })
        );
    }

    #[test]
    fn test_headers_included_only_on_request_and_last_wins() {
        let ctx = RequestContext {
            full_headers: true,
            ..Default::default()
        };
        let value = build(&outcome("{}"), &ctx);

        let headers = value["headers"].as_object().unwrap();
        assert_eq!(headers["content-type"], "application/json");
        // Duplicate set-cookie: last occurrence wins.
        assert_eq!(headers["set-cookie"], "b=2");

        let ctx = RequestContext::default();
        let value = build(&outcome("{}"), &ctx);
        assert!(value.get("headers").is_none());
    }

    #[test]
    fn test_full_status_carries_diagnostics() {
        let ctx = RequestContext {
            full_status: true,
            ..Default::default()
        };
        let value = build(&outcome("{}"), &ctx);

        assert_eq!(value["status"]["http_code"], 200);
        assert_eq!(value["status"]["url"], "http://example.com/data.json");
        assert_eq!(value["status"]["total_time_ms"], 5);
    }

    #[test]
    fn test_non_json_body_stays_raw_string() {
        let ctx = RequestContext::default();
        let value = build(&outcome("<html>nope</html>"), &ctx);
        assert_eq!(value["contents"], "<html>nope</html>");
    }

    #[test]
    fn test_falsy_json_values_are_used_as_parsed() {
        let ctx = RequestContext::default();

        assert_eq!(build(&outcome("0"), &ctx)["contents"], 0);
        assert_eq!(build(&outcome("false"), &ctx)["contents"], false);
        assert_eq!(build(&outcome("null"), &ctx)["contents"], Value::Null);
        assert_eq!(build(&outcome(r#""""#), &ctx)["contents"], "");
    }

    #[test]
    fn test_empty_body_falls_back_to_empty_string() {
        // An empty body is not valid JSON, so the raw (empty) string is used.
        let ctx = RequestContext::default();
        assert_eq!(build(&outcome(""), &ctx)["contents"], "");
    }

    #[test]
    fn test_error_outcome_envelope() {
        let ctx = RequestContext::default();
        let value = build(&FetchOutcome::error("ERROR: url not specified"), &ctx);

        assert_eq!(
            value,
            serde_json::json!({
                "status": { "http_code": "ERROR" },
                "contents": "ERROR: url not specified"
            })
        );
    }
}
