//! Same-Origin JSON Forwarding Proxy
//!
//! A forwarding proxy built with Tokio and Axum: a same-origin client asks
//! for a remote `.json` resource, the proxy fetches it server-side and
//! returns it either as a raw passthrough or wrapped in a JSON/JSONP
//! envelope.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                 JSON PROXY                    │
//!                       │                                               │
//!   Client Request      │  ┌─────────┐   ┌──────────┐   ┌──────────┐  │
//!   ────────────────────┼─▶│  http   │──▶│ validate │──▶│ outbound │  │
//!                       │  │ server  │   └──────────┘   │ builder  │  │
//!                       │  └─────────┘                  └────┬─────┘  │
//!                       │                                     │        │
//!                       │                                     ▼        │
//!                       │  ┌──────────┐   ┌─────────┐   ┌──────────┐  │
//!   Client Response     │  │ response │◀──│ envelope│◀──│  fetch   │──┼──▶ Remote
//!   ◀───────────────────┼──│ renderer │   │ /native │   │ (reqwest)│  │    URL
//!                       │  └──────────┘   └─────────┘   └──────────┘  │
//!                       └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use json_proxy::config::loader::load_config;
use json_proxy::observability::logging;
use json_proxy::{HttpServer, ProxyConfig};

#[derive(Parser)]
#[command(name = "json-proxy")]
#[command(about = "Same-origin JSON forwarding proxy", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init(&config.observability.log_level);

    tracing::info!("json-proxy v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream_timeout_secs = config.upstream.timeout_secs,
        native_enabled = config.features.native_enabled,
        jsonp_enabled = config.features.jsonp_enabled,
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    // Create and run HTTP server
    let server = HttpServer::new(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
