// Server module entry
// Listener setup, connection handling, accept loop and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is exposed as server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Notify;

use crate::config::{AppState, Config};
use crate::logger;

pub use listener::create_reusable_listener;
pub use server_loop::start_server_loop;

/// Failures that stop the process
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ::config::ConfigError),
    #[error("invalid listen address: {0}")]
    Address(#[from] AddrParseError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Bind the configured address and serve until SIGINT or SIGTERM
pub async fn run(config: Config) -> Result<(), ServerError> {
    let addr = config.socket_addr()?;
    let listener =
        create_reusable_listener(addr).map_err(|source| ServerError::Bind { addr, source })?;
    logger::log_server_start(&addr, &config);

    let state = Arc::new(AppState::new(config));
    let shutdown = Arc::new(Notify::new());
    signal::start_signal_handler(Arc::clone(&shutdown));

    start_server_loop(listener, state, shutdown).await
}
