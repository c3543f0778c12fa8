//! Configuration management for casebox
//!
//! Settings are layered from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use casebox::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Backend: {}", config.api.base_url);
//! ```
//!
//! # Environment Variables
//!
//! Any key can be overridden with `CASEBOX__<section>__<key>`:
//! - `CASEBOX__API__BASE_URL=https://support.example.com`
//! - `CASEBOX__UPLOAD__MAX_FILE_SIZE=20MB`
//! - `CASEBOX__UPLOAD__MAX_FILES=5`
//!
//! The bearer token is read from `CASEBOX_TOKEN` only.
//!
//! # Configuration File
//!
//! Loaded from `config/casebox.toml` unless `CASEBOX_CONFIG` points elsewhere.

mod models;
mod sources;
mod validation;

pub use crate::humanize::ByteSize;
pub use models::{
    ApiConfig, Config, DownloadConfig, LoggingConfig, UploadConfig, UploadLimits,
};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or a value
    /// fails validation (zero limits, non-http URLs, blank container).
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path (environment and token still apply)
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_at(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
