//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via the tracing crate
//! - Request ID flows through all log events
//! - Log level configurable via config and environment (RUST_LOG wins)

pub mod logging;
