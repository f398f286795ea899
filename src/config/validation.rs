//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses non-empty)
//! - Catch timeout combinations that would cut off the upstream fetch
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address must not be empty")]
    EmptyBindAddress,

    #[error("upstream.timeout_secs must be greater than zero")]
    ZeroUpstreamTimeout,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("timeouts.request_secs ({request}) must not be shorter than upstream.timeout_secs ({upstream})")]
    RequestTimeoutBelowUpstream { request: u64, upstream: u64 },

    #[error("upstream.session_cookie_name must not be empty")]
    EmptySessionCookieName,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.is_empty() {
        errors.push(ValidationError::EmptyBindAddress);
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroUpstreamTimeout);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.timeouts.request_secs > 0
        && config.upstream.timeout_secs > 0
        && config.timeouts.request_secs < config.upstream.timeout_secs
    {
        errors.push(ValidationError::RequestTimeoutBelowUpstream {
            request: config.timeouts.request_secs,
            upstream: config.upstream.timeout_secs,
        });
    }

    if config.upstream.session_cookie_name.is_empty() {
        errors.push(ValidationError::EmptySessionCookieName);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
