use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "CASEBOX_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/casebox.toml";
const ENV_PREFIX: &str = "CASEBOX";
const ENV_SEPARATOR: &str = "__";
const TOKEN_ENV_VAR: &str = "CASEBOX_TOKEN";

/// Load configuration with priority (lowest first):
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. `.env` file (via dotenvy)
/// 4. System environment variables
pub fn load() -> Result<Config, ConfigError> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    load_with_secrets(config_path)
}

/// Like [`load`], but with an explicit config file path
pub fn load_at(config_path: PathBuf) -> Result<Config, ConfigError> {
    let _ = dotenvy::dotenv();
    load_with_secrets(config_path)
}

fn load_with_secrets(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut config = load_from_sources(config_path)?;
    load_secrets(&mut config);

    Ok(config)
}

/// The bearer token only ever comes from the environment
fn load_secrets(config: &mut Config) {
    if let Ok(token) = env::var(TOKEN_ENV_VAR) {
        if !token.trim().is_empty() {
            config.api.token = Some(token);
        }
    }
}

/// Load configuration from a specific path plus environment overrides
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!(path = %config_path.display(), "Loading configuration");
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::debug!(
            path = %config_path.display(),
            "Configuration file not found, using defaults and environment"
        );
    }

    // CASEBOX__UPLOAD__MAX_FILES -> upload.max_files
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}
