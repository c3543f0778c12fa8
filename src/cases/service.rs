use super::models::{
    Case, CasePage, CaseResolution, CaseStatement, RegisterCaseRequest, SupportCase,
};
use crate::attachments::Attachment;
use crate::client::{ApiClient, ApiClientError};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

const REGISTER_PATH: &str = "/cases/register";
const LIST_PATH: &str = "/cases/list";

#[derive(Debug, Error)]
pub enum CaseServiceError {
    #[error("invalid case id '{0}'")]
    InvalidCaseId(String),

    #[error(transparent)]
    Request(#[from] ApiClientError),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    cases: RegisteredCase,
}

#[derive(Debug, Deserialize)]
struct RegisteredCase {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    cases_list: Vec<Case>,
    cases_cnt: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewResponse {
    cases: Case,
    #[serde(default)]
    case_statements_list: Option<Vec<StatementItem>>,
    #[serde(default)]
    case_resolutions_list: Option<Vec<ResolutionItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementItem {
    symptom: String,
    needs: String,
    #[serde(default)]
    environments: Value,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolutionItem {
    #[serde(default)]
    content: Value,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentListResponse {
    #[serde(default)]
    case_attaches_list: Vec<Attachment>,
}

/// Read and create cases. Results are returned to the caller, which merges
/// them into whatever view state it keeps.
#[derive(Clone, Debug)]
pub struct CaseService {
    client: ApiClient,
}

impl CaseService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create a case with its first statement and return the new case id
    pub async fn register_case(
        &self,
        request: &RegisterCaseRequest,
        auth_token: Option<&str>,
    ) -> Result<String, CaseServiceError> {
        let response: RegisterResponse = self
            .client
            .post_json(REGISTER_PATH, request, auth_token)
            .await?;

        info!(case_id = %response.cases.id, number = %request.cases.number, "Case registered");
        Ok(response.cases.id)
    }

    /// One page of cases (1-based; page 0 is treated as 1), without sub-resources
    pub async fn list_cases(
        &self,
        page: u32,
        auth_token: Option<&str>,
    ) -> Result<CasePage, CaseServiceError> {
        let page = page.max(1);
        let response: ListResponse = self
            .client
            .get_json(LIST_PATH, &[("page", page.to_string())], auth_token)
            .await?;

        debug!(page, returned = response.cases_list.len(), total = response.cases_cnt, "Listed cases");

        Ok(CasePage {
            cases: response
                .cases_list
                .into_iter()
                .map(SupportCase::new)
                .collect(),
            total_count: response.cases_cnt,
        })
    }

    /// A case with its statements and resolutions; attachments are listed separately
    pub async fn view_case(
        &self,
        case_id: &str,
        auth_token: Option<&str>,
    ) -> Result<SupportCase, CaseServiceError> {
        let case_id = checked_case_id(case_id)?;
        let response: ViewResponse = self
            .client
            .get_json(&format!("/cases/{}", case_id), &[], auth_token)
            .await?;

        Ok(map_view(
            case_id,
            response,
            chrono::Utc::now().timestamp_millis(),
        ))
    }

    pub async fn list_attachments(
        &self,
        case_id: &str,
        auth_token: Option<&str>,
    ) -> Result<Vec<Attachment>, CaseServiceError> {
        let case_id = checked_case_id(case_id)?;
        let response: AttachmentListResponse = self
            .client
            .get_json(&format!("/cases/{}/attaches/list", case_id), &[], auth_token)
            .await?;

        Ok(response
            .case_attaches_list
            .into_iter()
            .map(|mut attachment| {
                if attachment.case_id.is_empty() {
                    attachment.case_id = case_id.to_string();
                }
                attachment
            })
            .collect())
    }
}

fn checked_case_id(case_id: &str) -> Result<&str, CaseServiceError> {
    let trimmed = case_id.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '?', '#']) {
        return Err(CaseServiceError::InvalidCaseId(case_id.to_string()));
    }
    Ok(trimmed)
}

/// JSON columns arrive as objects and are kept as JSON text; null becomes `{}`
fn json_text(value: Value) -> String {
    match value {
        Value::Null => "{}".to_string(),
        other => other.to_string(),
    }
}

fn map_view(case_id: &str, response: ViewResponse, now_millis: i64) -> SupportCase {
    let statements = response
        .case_statements_list
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, item)| CaseStatement {
            id: format!("st-{}-{}-{}", case_id, index, now_millis),
            case_id: case_id.to_string(),
            symptom: item.symptom,
            needs: item.needs,
            environments: json_text(item.environments),
            created_at: item.created_at,
            updated_at: item.updated_at,
            created_by: None,
            updated_by: None,
        })
        .collect();

    let resolutions = response
        .case_resolutions_list
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, item)| CaseResolution {
            id: format!("rs-{}-{}-{}", case_id, index, now_millis),
            case_id: case_id.to_string(),
            content: json_text(item.content),
            created_at: item.created_at,
            updated_at: item.updated_at,
            created_by: None,
            updated_by: None,
        })
        .collect();

    SupportCase {
        base: response.cases,
        attachments: Vec::new(),
        statements,
        resolutions,
    }
}
