//! Response rendering.
//!
//! # Responsibilities
//! - Native mode: replay the allow-listed headers and write the raw body
//! - Enveloped mode: serialize the envelope, apply JSONP wrapping, and pick
//!   the response content-type
//!
//! # Design Decisions
//! - Content-type reflects how the client consumes the payload:
//!   `application/json` for XHR-style callers, `application/x-javascript`
//!   otherwise
//! - Header pairs that do not survive the round-trip to typed header values
//!   are skipped rather than failing the response

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};

use crate::pipeline::types::PipelineOutput;

/// Render the pipeline's output into an HTTP response.
pub fn render(output: PipelineOutput) -> Response {
    match output {
        PipelineOutput::Native { headers, body } => {
            let mut response = Response::new(Body::from(body));
            for (name, value) in headers {
                let name = match HeaderName::from_bytes(name.as_bytes()) {
                    Ok(name) => name,
                    Err(_) => continue,
                };
                let value = match HeaderValue::from_str(&value) {
                    Ok(value) => value,
                    Err(_) => continue,
                };
                // append, not insert: multiple Set-Cookie headers must survive
                response.headers_mut().append(name, value);
            }
            response
        }
        PipelineOutput::Enveloped {
            data,
            is_xhr,
            callback,
        } => {
            let json = data.to_string();
            let body = match callback {
                Some(name) => format!("{}({})", name, json),
                None => json,
            };
            let content_type = if is_xhr {
                "application/json"
            } else {
                "application/x-javascript"
            };
            ([(CONTENT_TYPE, content_type)], body).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Bytes};

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_enveloped_bare_json() {
        let response = render(PipelineOutput::Enveloped {
            data: serde_json::json!({ "contents": { "a": 1 } }),
            is_xhr: false,
            callback: None,
        });

        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/x-javascript"
        );
        assert_eq!(body_string(response).await, r#"{"contents":{"a":1}}"#);
    }

    #[tokio::test]
    async fn test_enveloped_xhr_content_type() {
        let response = render(PipelineOutput::Enveloped {
            data: serde_json::json!({}),
            is_xhr: true,
            callback: None,
        });

        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_jsonp_wrapping() {
        let response = render(PipelineOutput::Enveloped {
            data: serde_json::json!({ "contents": "x" }),
            is_xhr: false,
            callback: Some("myCallback".into()),
        });

        assert_eq!(body_string(response).await, r#"myCallback({"contents":"x"})"#);
    }

    #[tokio::test]
    async fn test_native_headers_and_raw_body() {
        let response = render(PipelineOutput::Native {
            headers: vec![
                ("content-type".to_string(), "text/html".to_string()),
                ("set-cookie".to_string(), "a=1".to_string()),
                ("set-cookie".to_string(), "b=2".to_string()),
            ],
            body: Bytes::from_static(b"<html></html>"),
        });

        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "text/html");
        let cookies: Vec<_> = response.headers().get_all("set-cookie").iter().collect();
        assert_eq!(cookies.len(), 2);
        assert_eq!(body_string(response).await, "<html></html>");
    }

    #[tokio::test]
    async fn test_native_skips_unrepresentable_headers() {
        let response = render(PipelineOutput::Native {
            headers: vec![("bad name".to_string(), "x".to_string())],
            body: Bytes::new(),
        });

        assert!(response.headers().get("bad name").is_none());
        assert_eq!(body_string(response).await, "");
    }
}
