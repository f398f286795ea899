//! Outbound request assembly.
//!
//! # Responsibilities
//! - Attach posted form fields verbatim when the inbound method is POST
//! - Build the forwarded `Cookie:` header when requested
//! - Resolve the outbound user-agent (override → passthrough → unset)
//!
//! # Design Decisions
//! - Pure assembly, no network activity
//! - An empty cookie set yields no cookie header, never a malformed one
//! - The session id is an opaque `name=value` pair supplied by the caller of
//!   the pipeline; it is appended only when both forwarding flags are set

use axum::http::Method;
use url::Url;

use crate::pipeline::types::{OutboundRequest, RequestContext};

/// Assemble the outbound request for a validated target URL.
pub fn build(url: Url, ctx: &RequestContext) -> OutboundRequest {
    let form_body = if ctx.method == Method::POST {
        Some(ctx.form_fields.clone())
    } else {
        None
    };

    let cookie_header = if ctx.send_cookies {
        let mut pairs: Vec<String> = ctx
            .cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        if ctx.send_session {
            if let Some(session) = &ctx.session_cookie {
                // Skip the append when the session cookie was already part of
                // the inbound cookie set.
                if !pairs.iter().any(|pair| pair == session) {
                    pairs.push(session.clone());
                }
            }
        }
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    } else {
        None
    };

    let user_agent = ctx
        .user_agent_override
        .clone()
        .or_else(|| ctx.caller_user_agent.clone());

    OutboundRequest {
        url,
        method: ctx.method.clone(),
        form_body,
        cookie_header,
        user_agent,
    }
}
