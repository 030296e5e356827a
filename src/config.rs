//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::view::RefreshStrategy;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub view: ViewConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Hosted data store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Service endpoint, e.g. `https://xyz.supabase.co`
    #[serde(default)]
    pub url: String,

    /// Access key sent with every request
    #[serde(default)]
    pub anon_key: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout() -> u64 {
    10_000
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

impl RemoteConfig {
    /// Both endpoint and key are present
    pub fn is_complete(&self) -> bool {
        !self.url.is_empty() && !self.anon_key.is_empty()
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Page behaviour
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub refresh: RefreshStrategy,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("okr-board").join("config.toml")),
            Some(PathBuf::from("/etc/okr-board/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Remote store
        if let Some(url) = var("OKR_SUPABASE_URL").or_else(|| var("SUPABASE_URL")) {
            self.remote.url = url;
        }
        if let Some(key) = var("OKR_SUPABASE_ANON_KEY").or_else(|| var("SUPABASE_ANON_KEY")) {
            self.remote.anon_key = key;
        }

        // Server
        if let Some(host) = var("OKR_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("OKR_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }

        // View
        if let Some(refresh) = var("OKR_REFRESH") {
            match refresh.parse() {
                Ok(strategy) => self.view.refresh = strategy,
                Err(e) => tracing::warn!("Ignoring OKR_REFRESH: {}", e),
            }
        }

        // Logging
        if let Some(level) = var("OKR_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("OKR_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# OKR Board Configuration
#
# Environment variables override these settings:
# - OKR_SUPABASE_URL (or SUPABASE_URL)
# - OKR_SUPABASE_ANON_KEY (or SUPABASE_ANON_KEY)
# - OKR_HOST
# - OKR_PORT
# - OKR_REFRESH
# - OKR_LOG_LEVEL
# - OKR_LOG_FORMAT

[remote]
# Hosted store endpoint (tables are served under /rest/v1)
url = ""

# Access key sent as `apikey` and bearer token
anon_key = ""

# Per-request timeout in milliseconds
request_timeout_ms = 10000

[server]
host = "127.0.0.1"
port = 8090

[view]
# What to do after a successful create: full_reload or incremental
refresh = "full_reload"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
