use super::models::{Attachment, AttachmentSource, AttachmentStatus};
use crate::blob::UploadedFileRecord;
use crate::client::{ApiClient, ApiClientError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub const REGISTER_PATH: &str = "/cases/attaches/register";

#[derive(Debug, Error)]
pub enum RegistrarError {
    #[error("attachment registration failed: {0}")]
    Request(#[from] ApiClientError),

    #[error("registration returned {actual} ids for {expected} attachments")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("registration returned an empty id at position {index}")]
    EmptyId { index: usize },
}

impl RegistrarError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RegistrarError::Request(e) => e.status(),
            _ => None,
        }
    }
}

/// Persists attachment metadata for blobs that are already in storage
#[async_trait]
pub trait AttachmentRegistry: Send + Sync {
    /// All-or-nothing: either every record gets an id or the call fails
    async fn register(
        &self,
        case_id: &str,
        records: &[UploadedFileRecord],
        memo: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<Vec<Attachment>, RegistrarError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest<'a> {
    case_attaches_list: Vec<RegisterItem<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterItem<'a> {
    case_id: &'a str,
    url: &'a str,
    path: &'a str,
    name: &'a str,
    original: &'a str,
    memo: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    case_attaches_list: Vec<RegisteredId>,
}

#[derive(Debug, Deserialize)]
struct RegisteredId {
    id: String,
}

/// Registrar backed by the support backend's batch endpoint
#[derive(Clone, Debug)]
pub struct AttachmentRegistrar {
    client: ApiClient,
    source: AttachmentSource,
}

impl AttachmentRegistrar {
    pub fn new(client: ApiClient, source: AttachmentSource) -> Self {
        Self { client, source }
    }
}

#[async_trait]
impl AttachmentRegistry for AttachmentRegistrar {
    async fn register(
        &self,
        case_id: &str,
        records: &[UploadedFileRecord],
        memo: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<Vec<Attachment>, RegistrarError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let request = RegisterRequest {
            case_attaches_list: records
                .iter()
                .map(|record| RegisterItem {
                    case_id,
                    url: &record.storage_base_url,
                    path: &record.path,
                    name: &record.stored_name,
                    original: &record.original_name,
                    memo,
                })
                .collect(),
        };

        let response: RegisterResponse = self
            .client
            .post_json(REGISTER_PATH, &request, auth_token)
            .await
            .map_err(|e| {
                warn!(case_id, attachments = records.len(), error = %e, "Registration failed");
                RegistrarError::from(e)
            })?;

        let attachments = zip_ids(case_id, records, memo, self.source, response.case_attaches_list)?;
        info!(case_id, attachments = attachments.len(), "Attachments registered");

        Ok(attachments)
    }
}

/// Response index `i` belongs to request index `i`; any length drift is fatal
fn zip_ids(
    case_id: &str,
    records: &[UploadedFileRecord],
    memo: Option<&str>,
    source: AttachmentSource,
    ids: Vec<RegisteredId>,
) -> Result<Vec<Attachment>, RegistrarError> {
    if ids.len() != records.len() {
        return Err(RegistrarError::LengthMismatch {
            expected: records.len(),
            actual: ids.len(),
        });
    }

    records
        .iter()
        .zip(ids)
        .enumerate()
        .map(|(index, (record, registered))| {
            if registered.id.trim().is_empty() {
                return Err(RegistrarError::EmptyId { index });
            }
            Ok(Attachment {
                id: registered.id,
                case_id: case_id.to_string(),
                url: record.storage_base_url.clone(),
                path: record.path.clone(),
                name: record.stored_name.clone(),
                original: record.original_name.clone(),
                memo: memo.map(str::to_string),
                status: AttachmentStatus::Wait,
                source,
                created_at: None,
                updated_at: None,
            })
        })
        .collect()
}
