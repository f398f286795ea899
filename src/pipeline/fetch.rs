//! Outbound fetch execution.
//!
//! # Responsibilities
//! - Issue the assembled outbound request, following redirects
//! - Capture the final response's headers, body, and transport diagnostics
//! - Normalize transport failures into an in-band outcome (`http_code: 0`)
//!
//! # Design Decisions
//! - One attempt per request, no retries
//! - A bounded total timeout keeps a slow target from stalling the worker
//! - reqwest owns connection cleanup on every exit path, including a dropped
//!   future when the inbound request is cancelled

use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, COOKIE, USER_AGENT};
use reqwest::redirect::Policy;

use crate::config::schema::UpstreamConfig;
use crate::pipeline::split;
use crate::pipeline::types::{
    FetchOutcome, HttpCode, OutboundRequest, ProxyError, TransportDiagnostics, TransportStatus,
};

/// Executes outbound requests. One instance is shared by all handlers; the
/// underlying client pools connections without changing observable behavior.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Build a fetcher from upstream settings.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(Policy::limited(config.max_redirects))
            .build()?;
        Ok(Self { client })
    }

    /// Execute one fetch. Never fails: transport errors come back as an
    /// outcome with `http_code: 0` and the error text as the body.
    pub async fn fetch(&self, spec: OutboundRequest) -> FetchOutcome {
        let started = Instant::now();

        let mut request = self.client.request(spec.method.clone(), spec.url.clone());
        if let Some(fields) = &spec.form_body {
            request = request.form(fields);
        }
        if let Some(cookie) = &spec.cookie_header {
            request = request.header(COOKIE, cookie);
        }
        if let Some(user_agent) = &spec.user_agent {
            request = request.header(USER_AGENT, user_agent);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => return Self::failure_outcome(&spec, err),
        };

        let http_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let remote_addr = response.remote_addr().map(|addr| addr.to_string());
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        let headers = split::header_pairs(response.headers());

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => return Self::failure_outcome(&spec, err),
        };

        FetchOutcome {
            headers,
            status: TransportStatus {
                http_code: HttpCode::Code(http_code),
                diagnostics: Some(TransportDiagnostics {
                    url: final_url,
                    content_type,
                    size_download: body.len() as u64,
                    total_time_ms: started.elapsed().as_millis() as u64,
                    remote_addr,
                }),
            },
            body,
        }
    }

    fn failure_outcome(spec: &OutboundRequest, err: reqwest::Error) -> FetchOutcome {
        // The chained source usually carries the useful detail (dns error,
        // connection refused); reqwest's top-level message alone is vague.
        let detail = match std::error::Error::source(&err) {
            Some(source) => format!("{}: {}", err, source),
            None => err.to_string(),
        };
        let message = ProxyError::TransportFailure(detail).to_string();

        tracing::warn!(
            url = %spec.url,
            error = %err,
            "Outbound fetch failed"
        );

        FetchOutcome {
            headers: Vec::new(),
            body: message.into(),
            status: TransportStatus::transport_failure(),
        }
    }
}
