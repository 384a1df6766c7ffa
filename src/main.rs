mod api;
mod config;
mod handler;
mod http;
mod logger;
mod routing;
mod server;
mod validation;

use crate::server::ServerError;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Config file path without extension; config.toml by default
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = config::Config::load_from(&config_path).map_err(ServerError::from)?;

    logger::init(&cfg.logging)?;

    // Size the runtime from `server.workers`, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build().map_err(ServerError::from)?;

    runtime.block_on(server::run(cfg))?;
    tracing::info!("server stopped");
    Ok(())
}
