//! Short-lived, operation-scoped access to the blob container
//!
//! A fresh [`AccessDescriptor`] is requested for every batch and dropped once
//! the batch settles. Descriptors are never cached.

mod broker;

pub use broker::{AccessBroker, BrokerError, SignedUrlBroker};

use chrono::{DateTime, Utc};
use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Operation a descriptor is issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessOperation {
    Upload,
    Download,
}

impl fmt::Display for AccessOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessOperation::Upload => f.write_str("upload"),
            AccessOperation::Download => f.write_str("download"),
        }
    }
}

/// Capability to act on one container for a limited time
#[derive(Debug, Clone)]
pub struct AccessDescriptor {
    pub operation: AccessOperation,
    pub container: String,
    pub signed_url: Url,
    pub method: Method,
    pub required_headers: BTreeMap<String, String>,
    pub expires_on: DateTime<Utc>,
}

impl AccessDescriptor {
    /// Content type the broker asked for, if any (header names are case-insensitive)
    pub fn declared_content_type(&self) -> Option<&str> {
        self.required_headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_wire_names() {
        assert_eq!(
            serde_json::to_string(&AccessOperation::Upload).unwrap(),
            "\"upload\""
        );
        assert_eq!(AccessOperation::Download.to_string(), "download");
    }

    #[test]
    fn test_declared_content_type_ignores_case() {
        let mut descriptor =
            fixtures::descriptor(AccessOperation::Upload, "https://acct.blob.example/c?sig=1");
        assert_eq!(descriptor.declared_content_type(), Some("text/plain"));

        descriptor.required_headers.clear();
        descriptor
            .required_headers
            .insert("content-type".to_string(), String::new());
        assert_eq!(descriptor.declared_content_type(), None);
    }
}
