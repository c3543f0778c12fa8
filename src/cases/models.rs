use crate::attachments::Attachment;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Lifecycle of a support case; unknown backend values are kept verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CaseStatus {
    Open,
    Processing,
    Processed,
    Close,
    Other(String),
}

impl From<String> for CaseStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "OPEN" => CaseStatus::Open,
            "PROCESSING" => CaseStatus::Processing,
            "PROCESSED" => CaseStatus::Processed,
            "CLOSE" => CaseStatus::Close,
            _ => CaseStatus::Other(value),
        }
    }
}

impl From<CaseStatus> for String {
    fn from(value: CaseStatus) -> Self {
        value.to_string()
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseStatus::Open => f.write_str("OPEN"),
            CaseStatus::Processing => f.write_str("PROCESSING"),
            CaseStatus::Processed => f.write_str("PROCESSED"),
            CaseStatus::Close => f.write_str("CLOSE"),
            CaseStatus::Other(raw) => f.write_str(raw),
        }
    }
}

/// Case header as returned by the list and view endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: String,
    pub number: String,
    pub product_family: String,
    pub product_name: String,
    #[serde(default)]
    pub product_version: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    pub title: String,
    pub status: CaseStatus,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStatement {
    /// Synthesized client-side; the backend does not return statement ids
    pub id: String,
    pub case_id: String,
    pub symptom: String,
    pub needs: String,
    /// JSON text
    pub environments: String,
    pub created_at: String,
    pub updated_at: String,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseResolution {
    /// Synthesized client-side; the backend does not return resolution ids
    pub id: String,
    pub case_id: String,
    /// JSON text
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

/// A case with its sub-resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportCase {
    pub base: Case,
    pub attachments: Vec<Attachment>,
    pub statements: Vec<CaseStatement>,
    pub resolutions: Vec<CaseResolution>,
}

impl SupportCase {
    pub fn new(base: Case) -> Self {
        Self {
            base,
            attachments: Vec::new(),
            statements: Vec::new(),
            resolutions: Vec::new(),
        }
    }
}

/// One page of the case list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CasePage {
    pub cases: Vec<SupportCase>,
    pub total_count: u64,
}

/// Fields for a new case
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCase {
    pub number: String,
    pub title: String,
    pub product_family: String,
    pub product_name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
}

/// First statement filed with a new case
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCaseStatement {
    pub symptom: String,
    pub needs: String,
    pub environments: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCaseRequest {
    pub cases: NewCase,
    pub case_statements: NewCaseStatement,
}
