use crate::attachments::AttachmentSource;
use crate::blob::TimestampZone;
use crate::humanize::ByteSize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API settings shared by the broker, registrar and case service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Path of the signed-URL broker endpoint, relative to `base_url`
    #[serde(default = "default_access_path")]
    pub access_path: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Bearer token (loaded from environment, never from the config file)
    #[serde(skip)]
    pub token: Option<String>,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            access_path: default_access_path(),
            user_agent: default_user_agent(),
            token: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3100".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_access_path() -> String {
    "/storage/sas".to_string()
}

fn default_user_agent() -> String {
    concat!("casebox/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Upload limits and blob layout
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_file_size")]
    pub max_file_size: ByteSize,
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Container used when a signed URL carries no path segment
    #[serde(default = "default_container")]
    pub container: String,
    #[serde(default = "default_transfer_timeout_ms")]
    pub transfer_timeout_ms: u64,
    #[serde(default)]
    pub timestamp_zone: TimestampZone,
    /// Public base URL recorded on attachments; the signed URL origin when unset
    pub storage_base_url: Option<String>,
    #[serde(default)]
    pub attachment_source: AttachmentSource,
}

impl UploadConfig {
    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_millis(self.transfer_timeout_ms)
    }

    pub fn limits(&self) -> UploadLimits {
        UploadLimits {
            max_file_size: self.max_file_size,
            max_files: self.max_files,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            max_files: default_max_files(),
            container: default_container(),
            transfer_timeout_ms: default_transfer_timeout_ms(),
            timestamp_zone: TimestampZone::default(),
            storage_base_url: None,
            attachment_source: AttachmentSource::default(),
        }
    }
}

/// Limits checked before any network activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_file_size: ByteSize,
    pub max_files: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        UploadConfig::default().limits()
    }
}

fn default_max_file_size() -> ByteSize {
    ByteSize::mib(50)
}

fn default_max_files() -> usize {
    10
}

fn default_container() -> String {
    "case-attaches".to_string()
}

fn default_transfer_timeout_ms() -> u64 {
    300_000
}

/// Where fetched attachments land
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    #[serde(default = "default_download_directory")]
    pub directory: PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: default_download_directory(),
        }
    }
}

fn default_download_directory() -> PathBuf {
    PathBuf::from("downloads")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}
