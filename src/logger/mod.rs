//! Logger module
//!
//! Provides logging utilities for the catalog server including:
//! - Subscriber setup (text or JSON lines)
//! - Server lifecycle logging
//! - Access logging
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, LogFormat, LoggingConfig};
use crate::validation::ValidationError;

/// Initialize the global subscriber
///
/// `RUST_LOG` wins over `logging.level`. Calling this twice is harmless; the
/// second subscriber is rejected and the error returned.
pub fn init(config: &LoggingConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .compact(),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .json()
                    .with_current_span(false),
            )
            .try_init(),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        %addr,
        level = %config.logging.level,
        workers = ?config.server.workers,
        max_connections = ?config.performance.max_connections,
        "catalog server listening on http://{addr}"
    );
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("failed to serve connection: {err:?}");
}

pub fn log_connection_limit(peer_addr: &SocketAddr, limit: u64) {
    tracing::warn!(%peer_addr, limit, "connection limit reached, dropping connection");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_validation_failure(method: &str, path: &str, error: &ValidationError) {
    tracing::debug!(
        method,
        path,
        violations = error.violations().len(),
        "request rejected: {error}"
    );
}

pub fn log_shutdown() {
    tracing::info!("shutdown signal received, no longer accepting connections");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry) {
    tracing::info!(
        target: "access",
        method = %entry.method,
        path = %entry.path,
        status = entry.status,
        request_time_us = entry.request_time_us,
        "{}",
        entry.summary()
    );
}
