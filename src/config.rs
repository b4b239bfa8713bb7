//! Configuration management for RAX File Explorer
//!
//! Everything here is read once at startup; the sandbox root in particular
//! is fixed for the lifetime of the process.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::transfer::UploadLimits;

/// Locations searched for `config.toml`; earlier entries take precedence.
const CONFIG_PATHS: [&str; 2] = [
    "rax-file-explorer/config", // Docker production: /app/rax-file-explorer/config.toml
    "config",                   // Local development: ./config.toml
];

/// Upper bound for `max_upload_size_mb` (1 TiB).
const MAX_UPLOAD_SIZE_MB: u64 = 1024 * 1024;

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    // ═══ NETWORK (Environment Override Supported) ═══
    /// IP address to bind the HTTP listener
    pub bind_address: String,

    /// Port for the HTTP listener
    pub http_port: u16,

    // ═══ SANDBOX ═══
    /// Root directory every request is confined to
    pub server_root: String,

    /// Create the root directory at startup if it is missing
    pub create_root_if_missing: bool,

    // ═══ TRANSFERS ═══
    /// Maximum file upload size in MB
    /// Environment: RAX_EXPLORER__MAX_UPLOAD_SIZE_MB
    pub max_upload_size_mb: u64,

    /// Buffer size for writing uploads
    pub buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            http_port: 5080,
            server_root: "./server_root".to_string(),
            create_root_if_missing: true,
            max_upload_size_mb: 100,
            buffer_size: 8192,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("bind_address", defaults.bind_address)?
            .set_default("http_port", i64::from(defaults.http_port))?
            .set_default("server_root", defaults.server_root)?
            .set_default("create_root_if_missing", defaults.create_root_if_missing)?
            .set_default("max_upload_size_mb", defaults.max_upload_size_mb as i64)?
            .set_default("buffer_size", defaults.buffer_size as i64)?;

        for config_path in CONFIG_PATHS.iter().rev() {
            builder = builder.add_source(File::with_name(config_path).required(false));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("RAX_EXPLORER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.http_port == 0 {
            return Err(config::ConfigError::Message(
                "http_port cannot be 0".into(),
            ));
        }

        if self.server_root.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "server_root cannot be empty".into(),
            ));
        }

        if self.max_upload_size_mb == 0 {
            return Err(config::ConfigError::Message(
                "max_upload_size_mb must be greater than 0".into(),
            ));
        }

        if self.max_upload_size_mb > MAX_UPLOAD_SIZE_MB {
            return Err(config::ConfigError::Message(format!(
                "max_upload_size_mb must be at most {}",
                MAX_UPLOAD_SIZE_MB
            )));
        }

        if self.buffer_size == 0 {
            return Err(config::ConfigError::Message(
                "buffer_size must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Bind address and port as a socket address string
    pub fn http_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.http_port)
    }

    /// Get server root as PathBuf
    pub fn server_root_path(&self) -> PathBuf {
        PathBuf::from(&self.server_root)
    }

    /// Get maximum file size in bytes
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            max_bytes: self.max_upload_size_bytes(),
            buffer_size: self.buffer_size,
        }
    }
}
