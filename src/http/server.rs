//! HTTP server setup and the proxy handler.
//!
//! # Responsibilities
//! - Create the Axum router and wire up middleware (trace, timeout,
//!   request ID)
//! - Parse each inbound request into the pipeline's context
//! - Run the pipeline and render its output
//!
//! # Design Decisions
//! - One handler serves every path and method; all behavior is driven by
//!   directives, not routes
//! - The handler never fails: every pipeline outcome renders as a normal
//!   response, so clients always see the uniform contract

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, Method},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::http::request::{self, RequestIdLayer, X_REQUEST_ID};
use crate::http::response;
use crate::pipeline::{self, Fetcher};

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub fetcher: Fetcher,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let fetcher = Fetcher::new(&config.upstream)?;
        let state = AppState {
            config: Arc::new(config.clone()),
            fetcher,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler.
/// Builds the request context, runs the pipeline, renders the output.
async fn proxy_handler(
    State(state): State<AppState>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request_id = headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let ctx = request::build_context(
        method,
        &params,
        &headers,
        &body,
        &state.config.upstream.session_cookie_name,
    );

    tracing::debug!(
        request_id = %request_id,
        method = %ctx.method,
        url = ctx.url.as_deref().unwrap_or(""),
        native = ctx.native_mode,
        is_xhr = ctx.is_xhr,
        "Proxying request"
    );

    let output = pipeline::execute(&ctx, &state.config.features, &state.fetcher).await;

    response::render(output)
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
