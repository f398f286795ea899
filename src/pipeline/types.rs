//! Core data model for the request-transformation pipeline.
//!
//! Everything here is request-scoped: built when a request arrives, dropped
//! when its response has been written. There is no shared mutable state.

use axum::body::Bytes;
use axum::http::Method;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;
use url::Url;

/// Everything the pipeline needs to know about one inbound request.
///
/// Immutable after construction; built by the HTTP layer so the pipeline can
/// be exercised in tests without a server.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Inbound HTTP method; POST bodies are forwarded, everything else is
    /// fetched as GET-like.
    pub method: Method,

    /// Target resource from the `url` directive, if any.
    pub url: Option<String>,

    /// Explicit `user_agent` directive, overriding passthrough.
    pub user_agent_override: Option<String>,

    /// The caller's own User-Agent header.
    pub caller_user_agent: Option<String>,

    /// Forward all inbound cookies (`send_cookies`).
    pub send_cookies: bool,

    /// Additionally forward the session cookie (`send_session`).
    pub send_session: bool,

    /// Include the full response-header map in the envelope (`full_headers`).
    pub full_headers: bool,

    /// Include full transport diagnostics in the envelope (`full_status`).
    pub full_status: bool,

    /// Raw passthrough requested (`mode=native`).
    pub native_mode: bool,

    /// JSONP function name from the `callback` directive.
    pub callback: Option<String>,

    /// Caller flagged itself as an in-page script request
    /// (X-Requested-With: XMLHttpRequest).
    pub is_xhr: bool,

    /// Posted form fields, forwarded verbatim when the method is POST.
    pub form_fields: Vec<(String, String)>,

    /// Inbound cookies in header order.
    pub cookies: Vec<(String, String)>,

    /// The session cookie as an opaque `name=value` pair, when present.
    pub session_cookie: Option<String>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            method: Method::GET,
            url: None,
            user_agent_override: None,
            caller_user_agent: None,
            send_cookies: false,
            send_session: false,
            full_headers: false,
            full_status: false,
            native_mode: false,
            callback: None,
            is_xhr: false,
            form_fields: Vec::new(),
            cookies: Vec::new(),
            session_cookie: None,
        }
    }
}

/// A fully assembled outbound request, ready for the fetcher.
///
/// Owned exclusively by the fetch step; never mutated after construction.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: Url,
    pub method: Method,

    /// Form fields attached as the body; present only for POST.
    pub form_body: Option<Vec<(String, String)>>,

    /// Pre-joined `Cookie:` header value; absent when nothing is forwarded.
    pub cookie_header: Option<String>,

    /// Resolved `User-Agent:` value; absent leaves the header unset.
    pub user_agent: Option<String>,
}

/// Final HTTP status code, or a sentinel for requests that never produced one.
///
/// Serializes as the bare number, or as the string `"ERROR"` for validation
/// and mode failures. Transport failures use code `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpCode {
    Code(u16),
    Error,
}

impl Serialize for HttpCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            HttpCode::Code(code) => serializer.serialize_u16(*code),
            HttpCode::Error => serializer.serialize_str("ERROR"),
        }
    }
}

/// Transport-level status record for one fetch.
///
/// `http_code` is always present; diagnostics exist only when an actual
/// exchange happened and are surfaced to clients only under `full_status`.
#[derive(Debug, Clone, Serialize)]
pub struct TransportStatus {
    pub http_code: HttpCode,

    #[serde(flatten)]
    pub diagnostics: Option<TransportDiagnostics>,
}

impl TransportStatus {
    /// Status for validation/mode failures: `{"http_code": "ERROR"}`.
    pub fn error() -> Self {
        Self {
            http_code: HttpCode::Error,
            diagnostics: None,
        }
    }

    /// Status for transport failures: code 0, no response received.
    pub fn transport_failure() -> Self {
        Self {
            http_code: HttpCode::Code(0),
            diagnostics: None,
        }
    }
}

/// Diagnostics captured alongside a completed fetch.
#[derive(Debug, Clone, Serialize)]
pub struct TransportDiagnostics {
    /// Final URL after redirects.
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Body size in bytes.
    pub size_download: u64,

    /// Wall-clock time for the whole fetch.
    pub total_time_ms: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_addr: Option<String>,
}

/// What came back from the fetch step, on every path.
///
/// Failures are represented in-band: the status carries an error code and the
/// body carries the human-readable message, so downstream steps never branch
/// on success vs. failure.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Final response headers in wire order, duplicates preserved.
    pub headers: Vec<(String, String)>,

    /// Raw response body.
    pub body: Bytes,

    pub status: TransportStatus,
}

impl FetchOutcome {
    /// An outcome representing a pipeline error: no headers, the message as
    /// the body, status `{"http_code": "ERROR"}`.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            headers: Vec::new(),
            body: Bytes::from(message.into()),
            status: TransportStatus::error(),
        }
    }
}

/// What the pipeline hands back to the HTTP layer for rendering.
#[derive(Debug)]
pub enum PipelineOutput {
    /// Raw passthrough: allow-listed headers plus the verbatim body.
    Native {
        headers: Vec<(String, String)>,
        body: Bytes,
    },

    /// JSON(P) envelope, rendered with the right content-type and optional
    /// callback wrapping by the HTTP layer.
    Enveloped {
        data: serde_json::Value,
        is_xhr: bool,
        callback: Option<String>,
    },
}

/// Everything that can go wrong inside the pipeline.
///
/// None of these escape to the HTTP layer as errors; each is normalized into
/// the same output shape used for success. The display strings are the
/// client-visible `contents` messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    #[error("ERROR: url not specified")]
    MissingTarget,

    #[error("ERROR: invalid url")]
    InvalidTarget,

    #[error("ERROR: invalid mode")]
    ModeDisabled,

    #[error("ERROR: {0}")]
    TransportFailure(String),
}

/// Minimal status view used when `full_status` is not requested.
pub struct MinimalStatus<'a>(pub &'a TransportStatus);

impl Serialize for MinimalStatus<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("http_code", &self.0.http_code)?;
        map.end()
    }
}
