// Configuration module entry point
// Layered configuration: optional file, then CATALOG_* environment, over defaults

mod state;
mod types;

use std::net::{AddrParseError, SocketAddr};

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};

// Re-export public types
pub use state::AppState;
pub use types::{Config, LogFormat, LoggingConfig};

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        with_defaults()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("CATALOG").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only, ignoring files and environment
    pub fn defaults() -> Result<Self, ConfigError> {
        with_defaults()?.build()?.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}

fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8000)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.access_log", true)?
        .set_default("performance.keep_alive_timeout", 75)?
        .set_default("performance.read_timeout", 30)?
        .set_default("performance.write_timeout", 30)?
        .set_default("http.server_name", "item-catalog")?
        .set_default("http.max_body_size", 1_048_576)? // 1MB
        .set_default("http.redirect_slashes", true)?
        .set_default("routes.health.enabled", true)?
        .set_default("routes.health.path", "/healthz")?
        .set_default("routes.openapi_path", "/openapi.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::defaults().unwrap();
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.server.workers, None);
        assert_eq!(cfg.logging.format, LogFormat::Text);
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.performance.max_connections, None);
        assert_eq!(cfg.http.max_body_size, 1_048_576);
        assert!(cfg.routes.health.enabled);
        assert_eq!(cfg.routes.health.path, "/healthz");
        assert_eq!(cfg.routes.openapi_path, "/openapi.json");
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::defaults().unwrap();
        assert_eq!(cfg.socket_addr().unwrap().to_string(), "127.0.0.1:8000");
        cfg.server.host = "not a host".to_string();
        assert!(cfg.socket_addr().is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let cfg = Config::load_from("does-not-exist/catalog").unwrap();
        assert_eq!(cfg.http.server_name, "item-catalog");
    }
}
