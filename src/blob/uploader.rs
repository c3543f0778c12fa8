//! Direct-to-storage transfer of a batch of files through a signed URL

use super::file::UploadFile;
use super::locator::{LocatorError, SignedLocator};
use super::naming::{FileNameGenerator, TimestampZone, UploadTarget, dated_sub_path, timestamped_name};
use crate::access::{AccessDescriptor, AccessOperation};
use crate::client::{ApiClientError, http_client};
use crate::config::{ByteSize, UploadConfig};
use crate::observability::TransferMetrics;
use crate::validation::{self, ValidationError};
use bon::Builder;
use chrono::NaiveDateTime;
use futures::future::join_all;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum TransferError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("descriptor was issued for {actual}, not {expected}")]
    WrongOperation {
        expected: AccessOperation,
        actual: AccessOperation,
    },

    #[error("invalid signed URL: {0}")]
    InvalidLocator(#[from] LocatorError),

    #[error("invalid header '{name}' for upload")]
    InvalidHeader { name: String },

    #[error("upload of '{file}' failed (HTTP {status}): {body}")]
    Rejected {
        file: String,
        status: u16,
        body: String,
    },

    #[error("upload of '{file}' timed out")]
    Timeout { file: String },

    #[error("upload of '{file}' failed: {message}")]
    Network { file: String, message: String },
}

impl TransferError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransferError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// File the failure belongs to, for per-file transfer errors
    pub fn file(&self) -> Option<&str> {
        match self {
            TransferError::Rejected { file, .. }
            | TransferError::Timeout { file }
            | TransferError::Network { file, .. } => Some(file),
            _ => None,
        }
    }
}

/// Result of one successful transfer; not durable until registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFileRecord {
    pub storage_base_url: String,
    /// `pathPrefix/datedSubPath`
    pub path: String,
    pub stored_name: String,
    pub original_name: String,
}

#[derive(Clone, Builder)]
pub struct UploadOptions {
    /// Grouping key, normally the owning case id
    #[builder(into)]
    pub path_prefix: String,
    /// Overrides the dated `YYYYMMDD` directory
    #[builder(into)]
    pub sub_path: Option<String>,
    pub file_name_generator: Option<FileNameGenerator>,
    pub access: AccessDescriptor,
    /// Moment for dated paths and names; now, in the uploader's zone, when unset
    pub moment: Option<NaiveDateTime>,
}

struct PreparedTransfer<'a> {
    file: &'a UploadFile,
    target: UploadTarget,
    url: Url,
    headers: HeaderMap,
}

pub struct BlobUploader {
    client: Client,
    max_file_size: ByteSize,
    default_container: String,
    storage_base_url: Option<String>,
    zone: TimestampZone,
    metrics: Arc<TransferMetrics>,
}

impl BlobUploader {
    pub fn new(
        config: &UploadConfig,
        user_agent: &str,
        metrics: Arc<TransferMetrics>,
    ) -> Result<Self, ApiClientError> {
        Ok(Self {
            client: http_client(user_agent, config.transfer_timeout())?,
            max_file_size: config.max_file_size,
            default_container: config.container.clone(),
            storage_base_url: config
                .storage_base_url
                .as_deref()
                .map(|url| url.trim_end_matches('/').to_string()),
            zone: config.timestamp_zone,
            metrics,
        })
    }

    /// Transfer every file in parallel and wait for all of them to settle
    ///
    /// Records come back in `files` order. A failed transfer fails the whole
    /// call, but in-flight siblings still run to completion; when several
    /// fail, the earliest file's error is returned.
    pub async fn upload(
        &self,
        files: &[UploadFile],
        options: &UploadOptions,
    ) -> Result<Vec<UploadedFileRecord>, TransferError> {
        let access = &options.access;
        if access.operation != AccessOperation::Upload {
            return Err(TransferError::WrongOperation {
                expected: AccessOperation::Upload,
                actual: access.operation,
            });
        }

        validation::check_sizes(files, self.max_file_size)?;

        if files.is_empty() {
            return Ok(Vec::new());
        }

        let locator = SignedLocator::parse(&access.signed_url, &self.default_container)?;
        let moment = options.moment.unwrap_or_else(|| self.zone.now());
        let targets = plan_targets(files, options, moment);

        // Everything that can fail locally fails before the first byte is sent
        let base_headers = required_headers(access)?;
        let mut prepared = Vec::with_capacity(files.len());
        for (file, target) in files.iter().zip(targets) {
            let url = locator.blob_url(&target.blob_path())?;
            let headers = file_headers(&base_headers, file, access)?;
            prepared.push(PreparedTransfer {
                file,
                target,
                url,
                headers,
            });
        }

        info!(
            files = files.len(),
            container = locator.container(),
            prefix = %options.path_prefix,
            "Uploading files"
        );

        let results = join_all(
            prepared
                .iter()
                .map(|transfer| self.transfer_one(transfer, access)),
        )
        .await;

        let storage_base_url = self
            .storage_base_url
            .clone()
            .unwrap_or_else(|| locator.origin().to_string());

        let mut records = Vec::with_capacity(prepared.len());
        let mut first_error = None;
        for (transfer, result) in prepared.into_iter().zip(results) {
            match result {
                Ok(()) => records.push(UploadedFileRecord {
                    storage_base_url: storage_base_url.clone(),
                    path: transfer.target.directory(),
                    stored_name: transfer.target.generated_file_name,
                    original_name: transfer.file.name.clone(),
                }),
                Err(e) => {
                    warn!(file = %transfer.file.name, error = %e, "Upload failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(records),
        }
    }

    async fn transfer_one(
        &self,
        transfer: &PreparedTransfer<'_>,
        access: &AccessDescriptor,
    ) -> Result<(), TransferError> {
        let file = transfer.file;
        debug!(file = %file.name, blob = %transfer.target.blob_path(), size = file.len(), "Starting upload");

        let response = self
            .client
            .request(access.method.clone(), transfer.url.clone())
            .headers(transfer.headers.clone())
            .body(file.bytes.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransferError::Timeout {
                        file: file.name.clone(),
                    }
                } else {
                    TransferError::Network {
                        file: file.name.clone(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = if body.is_empty() {
                status.canonical_reason().unwrap_or("Unknown").to_string()
            } else {
                body
            };
            return Err(TransferError::Rejected {
                file: file.name.clone(),
                status: status.as_u16(),
                body,
            });
        }

        self.metrics.file_uploaded(file.len());
        debug!(file = %file.name, status = status.as_u16(), "Upload completed");

        Ok(())
    }
}

/// Destination of every file for one batch, in `files` order
pub fn plan_targets(
    files: &[UploadFile],
    options: &UploadOptions,
    moment: NaiveDateTime,
) -> Vec<UploadTarget> {
    let sub_path = options
        .sub_path
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| dated_sub_path(moment));

    files
        .iter()
        .enumerate()
        .map(|(index, file)| {
            let name = match &options.file_name_generator {
                Some(generate) => generate(&file.name, index),
                None => timestamped_name(&file.name, moment),
            };
            UploadTarget::new(&options.path_prefix, sub_path.clone(), name)
        })
        .collect()
}

fn required_headers(access: &AccessDescriptor) -> Result<HeaderMap, TransferError> {
    let mut headers = HeaderMap::with_capacity(access.required_headers.len() + 2);
    for (name, value) in &access.required_headers {
        let invalid = || TransferError::InvalidHeader { name: name.clone() };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

/// Content type: the file's own, then the descriptor's, then octet-stream
fn file_headers(
    base: &HeaderMap,
    file: &UploadFile,
    access: &AccessDescriptor,
) -> Result<HeaderMap, TransferError> {
    let content_type = file
        .content_type
        .as_deref()
        .filter(|ct| !ct.is_empty())
        .or_else(|| access.declared_content_type())
        .unwrap_or(mime::APPLICATION_OCTET_STREAM.as_ref());

    let mut headers = base.clone();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(content_type).map_err(|_| TransferError::InvalidHeader {
            name: CONTENT_TYPE.to_string(),
        })?,
    );
    headers.insert(CONTENT_LENGTH, HeaderValue::from(file.len()));
    Ok(headers)
}
