use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("api.base_url '{0}' must be an absolute http(s) URL")]
    InvalidBaseUrl(String),

    #[error("api.access_path '{0}' must start with '/'")]
    InvalidAccessPath(String),

    #[error("upload.storage_base_url '{0}' must be an absolute http(s) URL")]
    InvalidStorageBaseUrl(String),

    #[error("{field} must be positive")]
    ZeroLimit { field: &'static str },

    #[error("upload.container must not be empty")]
    EmptyContainer,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_api(config)?;
    validate_upload(config)?;
    Ok(())
}

fn is_http_url(value: &str) -> bool {
    reqwest::Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

fn validate_api(config: &Config) -> Result<(), ValidationError> {
    if !is_http_url(&config.api.base_url) {
        return Err(ValidationError::InvalidBaseUrl(config.api.base_url.clone()));
    }

    if !config.api.access_path.starts_with('/') {
        return Err(ValidationError::InvalidAccessPath(
            config.api.access_path.clone(),
        ));
    }

    if config.api.request_timeout_ms == 0 {
        return Err(ValidationError::ZeroLimit {
            field: "api.request_timeout_ms",
        });
    }

    Ok(())
}

fn validate_upload(config: &Config) -> Result<(), ValidationError> {
    let upload = &config.upload;

    if upload.max_files == 0 {
        return Err(ValidationError::ZeroLimit {
            field: "upload.max_files",
        });
    }

    if upload.max_file_size.as_u64() == 0 {
        return Err(ValidationError::ZeroLimit {
            field: "upload.max_file_size",
        });
    }

    if upload.transfer_timeout_ms == 0 {
        return Err(ValidationError::ZeroLimit {
            field: "upload.transfer_timeout_ms",
        });
    }

    if upload.container.trim().is_empty() {
        return Err(ValidationError::EmptyContainer);
    }

    if let Some(base) = &upload.storage_base_url {
        if !is_http_url(base) {
            return Err(ValidationError::InvalidStorageBaseUrl(base.clone()));
        }
    }

    Ok(())
}
