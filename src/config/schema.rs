//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the forwarding proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Outbound fetch settings.
    pub upstream: UpstreamConfig,

    /// Output-mode feature flags.
    pub features: FeatureConfig,

    /// Timeout configuration for inbound requests.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Outbound fetch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Total timeout for one outbound fetch in seconds.
    pub timeout_secs: u64,

    /// Maximum redirects followed before the fetch is abandoned.
    pub max_redirects: usize,

    /// Name of the inbound cookie treated as the session id.
    /// Forwarded only when both `send_cookies` and `send_session` are set.
    pub session_cookie_name: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            max_redirects: 10,
            session_cookie_name: "sid".to_string(),
        }
    }
}

/// Output-mode feature flags.
///
/// Both are deployment decisions consumed by the pipeline; callers cannot
/// enable them per request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Allow `mode=native` raw passthrough. When disabled, a native-mode
    /// request is answered with an enveloped error instead.
    pub native_enabled: bool,

    /// Honor the `callback` directive and emit JSONP. When disabled,
    /// `callback` is ignored and bare JSON is emitted.
    pub jsonp_enabled: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            native_enabled: false,
            jsonp_enabled: false,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    /// Must cover the upstream fetch timeout.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
