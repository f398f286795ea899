//! Same-Origin JSON Forwarding Proxy Library

pub mod config;
pub mod http;
pub mod observability;
pub mod pipeline;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
