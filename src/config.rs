//! Configuration management for credstore
//!
//! Values come from built-in defaults, then an optional `config.toml`, then
//! `CREDSTORE_*` environment variables.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: i64 = 4002;
const DEFAULT_MAX_LINE_LENGTH: i64 = 4096;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Service configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// IP address the line protocol listens on
    /// Environment: CREDSTORE_BIND_ADDRESS
    pub bind_address: String,

    /// TCP port for the line protocol; 0 is rejected
    pub port: u16,

    /// JSON credentials file. Unset means authorization is disabled and
    /// every request is allowed.
    /// Environment: CREDSTORE_CREDENTIALS_FILE
    pub credentials_file: Option<String>,

    /// Consult the verified-hash cache before bcrypt
    pub use_hash_cache: bool,

    /// Longest accepted request line, in bytes
    pub max_line_length: usize,

    /// Default log filter when RUST_LOG is not set
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from `config.toml` (if present) with environment
    /// overrides.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration using `path` as the optional file source (the
    /// extension may be omitted).
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        let settings = Self::defaults()?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("CREDSTORE"))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    {
        Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("port", DEFAULT_PORT)?
            .set_default("use_hash_cache", true)?
            .set_default("max_line_length", DEFAULT_MAX_LINE_LENGTH)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.max_line_length == 0 {
            return Err(config::ConfigError::Message(
                "max_line_length must be greater than 0".into(),
            ));
        }

        if self.credentials_file.as_deref().is_some_and(str::is_empty) {
            return Err(config::ConfigError::Message(
                "credentials_file cannot be empty; omit it to disable auth".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as socket address
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Credentials file as a path, if authorization is enabled
    pub fn credentials_path(&self) -> Option<PathBuf> {
        self.credentials_file.as_ref().map(PathBuf::from)
    }

    pub fn auth_enabled(&self) -> bool {
        self.credentials_file.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT as u16,
            credentials_file: None,
            use_hash_cache: true,
            max_line_length: DEFAULT_MAX_LINE_LENGTH as usize,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}
