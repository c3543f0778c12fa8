use super::{AccessDescriptor, AccessOperation};
use crate::client::{ApiClient, ApiClientError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("container name must not be empty")]
    EmptyContainer,

    #[error("access broker unavailable: {0}")]
    Unavailable(String),

    #[error("access broker timed out")]
    Timeout,

    #[error("access broker rejected request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("access broker returned an invalid descriptor: {0}")]
    InvalidDescriptor(String),
}

impl BrokerError {
    pub fn status(&self) -> Option<u16> {
        match self {
            BrokerError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ApiClientError> for BrokerError {
    fn from(err: ApiClientError) -> Self {
        match err {
            ApiClientError::Timeout => BrokerError::Timeout,
            ApiClientError::Status { status, body } => BrokerError::Rejected { status, body },
            ApiClientError::Decode(msg) => BrokerError::InvalidDescriptor(msg),
            ApiClientError::Unreachable(msg) | ApiClientError::Build(msg) => {
                BrokerError::Unavailable(msg)
            }
        }
    }
}

/// Issues access descriptors for a storage container
#[async_trait]
pub trait AccessBroker: Send + Sync {
    async fn request_access(
        &self,
        operation: AccessOperation,
        container: &str,
        auth_token: Option<&str>,
    ) -> Result<AccessDescriptor, BrokerError>;
}

#[derive(Debug, Serialize)]
struct AccessRequest<'a> {
    operation: AccessOperation,
    container: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessResponse {
    sas_url: String,
    expires_on: DateTime<Utc>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    headers: BTreeMap<String, String>,
}

/// Broker backed by the support backend's signed-URL endpoint
#[derive(Clone, Debug)]
pub struct SignedUrlBroker {
    client: ApiClient,
    path: String,
}

impl SignedUrlBroker {
    pub fn new(client: ApiClient, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
        }
    }
}

#[async_trait]
impl AccessBroker for SignedUrlBroker {
    async fn request_access(
        &self,
        operation: AccessOperation,
        container: &str,
        auth_token: Option<&str>,
    ) -> Result<AccessDescriptor, BrokerError> {
        if container.trim().is_empty() {
            return Err(BrokerError::EmptyContainer);
        }

        debug!(%operation, container, "Requesting access descriptor");

        let response: AccessResponse = self
            .client
            .post_json(
                &self.path,
                &AccessRequest {
                    operation,
                    container,
                },
                auth_token,
            )
            .await
            .map_err(|e| {
                warn!(%operation, container, error = %e, "Access request failed");
                BrokerError::from(e)
            })?;

        let descriptor = into_descriptor(operation, container, response)?;
        info!(
            %operation,
            container,
            expires_on = %descriptor.expires_on,
            "Access descriptor issued"
        );

        Ok(descriptor)
    }
}

fn into_descriptor(
    operation: AccessOperation,
    container: &str,
    response: AccessResponse,
) -> Result<AccessDescriptor, BrokerError> {
    let signed_url = Url::parse(&response.sas_url)
        .map_err(|e| BrokerError::InvalidDescriptor(format!("sasUrl: {}", e)))?;

    if !matches!(signed_url.scheme(), "http" | "https") || !signed_url.has_host() {
        return Err(BrokerError::InvalidDescriptor(format!(
            "sasUrl must be an absolute http(s) URL, got scheme '{}'",
            signed_url.scheme()
        )));
    }

    let method = match response.method.as_deref().map(str::trim) {
        None | Some("") => Method::PUT,
        Some(verb) => Method::from_bytes(verb.to_ascii_uppercase().as_bytes())
            .map_err(|_| BrokerError::InvalidDescriptor(format!("method '{}'", verb)))?,
    };

    Ok(AccessDescriptor {
        operation,
        container: container.to_string(),
        signed_url,
        method,
        required_headers: response.headers,
        expires_on: response.expires_on,
    })
}
