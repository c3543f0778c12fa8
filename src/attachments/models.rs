use serde::{Deserialize, Serialize};

/// Verification state of an attachment; new uploads start at `WAIT`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentStatus {
    #[default]
    #[serde(rename = "WAIT")]
    Wait,
    #[serde(rename = "VERIFY")]
    Verify,
    #[serde(rename = "DELETE")]
    Delete,
}

/// Which client surface produced the attachment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentSource {
    #[serde(rename = "BROWSER", alias = "browser")]
    Browser,
    #[default]
    #[serde(rename = "WEBAPPS", alias = "webapps")]
    WebApps,
}

/// Attachment row persisted by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    #[serde(default)]
    pub case_id: String,
    pub url: String,
    pub path: String,
    pub name: String,
    pub original: String,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub status: AttachmentStatus,
    #[serde(rename = "type", default)]
    pub source: AttachmentSource,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Attachment {
    /// Path of the blob inside its container
    pub fn blob_path(&self) -> String {
        format!("{}/{}", self.path.trim_end_matches('/'), self.name)
    }
}
