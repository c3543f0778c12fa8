use super::locator::{LocatorError, SignedLocator};
use crate::access::{AccessDescriptor, AccessOperation};
use crate::client::{ApiClientError, http_client};
use bytes::Bytes;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("descriptor was issued for {actual}, not {expected}")]
    WrongOperation {
        expected: AccessOperation,
        actual: AccessOperation,
    },

    #[error("invalid signed URL: {0}")]
    InvalidLocator(#[from] LocatorError),

    #[error("download of '{blob}' failed (HTTP {status}): {body}")]
    Rejected {
        blob: String,
        status: u16,
        body: String,
    },

    #[error("download of '{blob}' timed out")]
    Timeout { blob: String },

    #[error("download of '{blob}' failed: {message}")]
    Network { blob: String, message: String },

    #[error("failed to write attachment: {0}")]
    Io(#[from] std::io::Error),
}

/// Fetches single blobs through a `download` descriptor
pub struct BlobDownloader {
    client: Client,
    default_container: String,
}

impl BlobDownloader {
    pub fn new(
        default_container: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, ApiClientError> {
        Ok(Self {
            client: http_client(user_agent, timeout)?,
            default_container: default_container.into(),
        })
    }

    pub async fn download(
        &self,
        blob_path: &str,
        access: &AccessDescriptor,
    ) -> Result<Bytes, DownloadError> {
        if access.operation != AccessOperation::Download {
            return Err(DownloadError::WrongOperation {
                expected: AccessOperation::Download,
                actual: access.operation,
            });
        }

        let locator = SignedLocator::parse(&access.signed_url, &self.default_container)?;
        let url = locator.blob_url(blob_path)?;

        // No request content type on a GET
        let mut headers = HeaderMap::new();
        for (name, value) in &access.required_headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                if name != CONTENT_TYPE {
                    headers.insert(name, value);
                }
            }
        }

        debug!(blob = blob_path, container = locator.container(), "Starting download");

        let blob = blob_path.to_string();
        let response = self
            .client
            .request(reqwest::Method::GET, url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DownloadError::Timeout { blob: blob.clone() }
                } else {
                    DownloadError::Network {
                        blob: blob.clone(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DownloadError::Rejected {
                blob,
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| DownloadError::Network {
            blob: blob.clone(),
            message: format!("Failed to read body: {}", e),
        })?;

        debug!(blob = %blob, size = bytes.len(), "Download completed");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::fixtures::descriptor;

    #[tokio::test]
    async fn test_upload_descriptor_rejected() {
        let downloader =
            BlobDownloader::new("case-attaches", "casebox-test", Duration::from_secs(1)).unwrap();
        let access = descriptor(AccessOperation::Upload, "http://127.0.0.1:9/c?sig=x");

        let err = downloader.download("case-1/20260105/a.txt", &access).await.unwrap_err();
        assert!(matches!(err, DownloadError::WrongOperation { .. }));
    }
}
