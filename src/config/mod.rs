// Configuration module entry point
// Loads layered configuration and holds the shared application state

mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

// Re-export public types
pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Environment variable naming the config file (without extension)
const CONFIG_PATH_VAR: &str = "SERVLET_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from the file named by `SERVLET_CONFIG`, or "config"
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = config_path(std::env::var(CONFIG_PATH_VAR).ok());
        Self::load_from(&path)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Sources, lowest priority first: built-in defaults, the optional file,
    /// `SERVLET_<SECTION>__<KEY>` environment variables.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_path, env_source())
    }

    fn load_with_env(
        config_path: &str,
        env: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(env)
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.backlog", 128)?
            .set_default("http.server_name", "servlet-studies")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Upper bound on a connection's lifetime
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(std::cmp::max(
            self.performance.read_timeout,
            self.performance.write_timeout,
        ))
    }
}

/// Config file stem: the `SERVLET_CONFIG` value when set and non-empty
fn config_path(value: Option<String>) -> String {
    value
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix("SERVLET")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
