//! Inbound request parsing and request identification.
//!
//! # Responsibilities
//! - Generate a unique request ID as early as possible for tracing
//! - Translate query directives, cookies, posted form fields, and caller
//!   headers into the pipeline's immutable [`RequestContext`]
//!
//! # Design Decisions
//! - Directive flags follow the original truthiness: absent, empty, or `0`
//!   means off; any other value means on
//! - The session cookie is materialized here (from the configured cookie
//!   name) so the pipeline only ever sees an opaque `name=value` pair
//! - Malformed cookies or form bodies degrade to "nothing parsed", never to
//!   a request failure

use std::collections::HashMap;
use std::task::{Context, Poll};

use axum::body::Bytes;
use axum::http::header::{CONTENT_TYPE, COOKIE, USER_AGENT};
use axum::http::{HeaderMap, HeaderValue, Method, Request};
use tower::{Layer, Service};
use uuid::Uuid;

use crate::pipeline::types::RequestContext;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Tower layer that stamps every request with an `x-request-id` (UUID v4)
/// unless the caller already supplied one.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service produced by [`RequestIdLayer`].
#[derive(Clone, Debug)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        if !req.headers().contains_key(X_REQUEST_ID) {
            if let Ok(value) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
                req.headers_mut().insert(X_REQUEST_ID, value);
            }
        }
        self.inner.call(req)
    }
}

/// Build the pipeline context from the parsed parts of an inbound request.
pub fn build_context(
    method: Method,
    params: &HashMap<String, String>,
    headers: &HeaderMap,
    body: &Bytes,
    session_cookie_name: &str,
) -> RequestContext {
    let cookies = parse_cookies(headers);
    let session_cookie = cookies
        .iter()
        .find(|(name, _)| name == session_cookie_name)
        .map(|(name, value)| format!("{}={}", name, value));

    let form_fields = if method == Method::POST && is_form_urlencoded(headers) {
        url::form_urlencoded::parse(body).into_owned().collect()
    } else {
        Vec::new()
    };

    RequestContext {
        url: directive(params, "url"),
        user_agent_override: directive(params, "user_agent"),
        caller_user_agent: header_str(headers, USER_AGENT.as_str()),
        send_cookies: flag(params, "send_cookies"),
        send_session: flag(params, "send_session"),
        full_headers: flag(params, "full_headers"),
        full_status: flag(params, "full_status"),
        native_mode: params.get("mode").map(String::as_str) == Some("native"),
        callback: directive(params, "callback"),
        is_xhr: is_xhr(headers),
        form_fields,
        cookies,
        session_cookie,
        method,
    }
}

/// A directive's value, if present and non-empty.
fn directive(params: &HashMap<String, String>, name: &str) -> Option<String> {
    params.get(name).filter(|v| !v.is_empty()).cloned()
}

/// Flag truthiness: absent, empty, or `0` is off.
fn flag(params: &HashMap<String, String>, name: &str) -> bool {
    matches!(params.get(name), Some(v) if !v.is_empty() && v != "0")
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(String::from)
}

fn is_xhr(headers: &HeaderMap) -> bool {
    header_str(headers, "x-requested-with")
        .map(|v| v.eq_ignore_ascii_case("xmlhttprequest"))
        .unwrap_or(false)
}

fn is_form_urlencoded(headers: &HeaderMap) -> bool {
    header_str(headers, CONTENT_TYPE.as_str())
        .map(|v| v.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

/// Parse `Cookie:` headers into (name, value) pairs, header order preserved.
/// Fragments without a `=` are skipped.
fn parse_cookies(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}
