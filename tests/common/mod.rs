//! In-process stand-ins for the support backend and the blob storage account

#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use casebox::config::Config;
use casebox::state::AppState;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SIGNATURE: &str = "c2lnbmVk";
pub const KNOWN_CASE: &str = "case-42";

#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// Everything the mock servers saw, plus knobs to make them misbehave
pub struct MockState {
    pub storage_url: String,
    pub broker_calls: AtomicUsize,
    pub put_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub register_calls: AtomicUsize,
    pub blobs: Mutex<HashMap<String, StoredBlob>>,
    pub broker_auth: Mutex<Vec<Option<String>>>,
    pub register_bodies: Mutex<Vec<Value>>,
    pub registered_cases: Mutex<Vec<Value>>,
    pub listed_pages: Mutex<Vec<u32>>,
    /// PUTs whose blob path contains this are refused with 403
    pub reject_put: Mutex<Option<String>>,
    /// Registration answers with one id too few
    pub register_short: AtomicBool,
    /// Registration fails with this status instead of answering
    pub register_status: Mutex<Option<StatusCode>>,
    /// Handlers sleep this long before answering PUTs / registrations
    pub put_delay: Mutex<Option<Duration>>,
    pub register_delay: Mutex<Option<Duration>>,
    next_id: AtomicUsize,
    attachments: Mutex<Vec<(String, Value)>>,
}

impl MockState {
    fn new(storage_url: String) -> Self {
        Self {
            storage_url,
            broker_calls: AtomicUsize::new(0),
            put_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            register_calls: AtomicUsize::new(0),
            blobs: Mutex::new(HashMap::new()),
            broker_auth: Mutex::new(Vec::new()),
            register_bodies: Mutex::new(Vec::new()),
            registered_cases: Mutex::new(Vec::new()),
            listed_pages: Mutex::new(Vec::new()),
            reject_put: Mutex::new(None),
            register_short: AtomicBool::new(false),
            register_status: Mutex::new(None),
            put_delay: Mutex::new(None),
            register_delay: Mutex::new(None),
            next_id: AtomicUsize::new(1),
            attachments: Mutex::new(Vec::new()),
        }
    }

    pub fn reject_puts_containing(&self, needle: &str) {
        *self.reject_put.lock().unwrap() = Some(needle.to_string());
    }

    pub fn blob(&self, key: &str) -> Option<StoredBlob> {
        self.blobs.lock().unwrap().get(key).cloned()
    }

    pub fn calls(&self) -> (usize, usize, usize) {
        (
            self.broker_calls.load(Ordering::SeqCst),
            self.put_calls.load(Ordering::SeqCst),
            self.register_calls.load(Ordering::SeqCst),
        )
    }
}

pub struct MockBackend {
    pub api_url: String,
    pub storage_url: String,
    pub state: Arc<MockState>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let storage_listener = bind().await;
        let api_listener = bind().await;

        let storage_url = format!("http://{}", storage_listener.local_addr().unwrap());
        let api_url = format!("http://{}", api_listener.local_addr().unwrap());
        let state = Arc::new(MockState::new(storage_url.clone()));

        let storage = Router::new()
            .route("/{container}/{*path}", put(put_blob).get(get_blob))
            .with_state(state.clone());

        let api = Router::new()
            .route("/storage/sas", post(issue_access))
            .route("/cases/attaches/register", post(register_attachments))
            .route("/cases/register", post(register_case))
            .route("/cases/list", get(list_cases))
            .route("/cases/{id}", get(view_case))
            .route("/cases/{id}/attaches/list", get(list_attachments))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(storage_listener, storage).await.unwrap();
        });
        tokio::spawn(async move {
            axum::serve(api_listener, api).await.unwrap();
        });

        Self {
            api_url,
            storage_url,
            state,
        }
    }

    /// Defaults pointed at this backend
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.api.base_url = self.api_url.clone();
        config.api.request_timeout_ms = 5_000;
        config.upload.transfer_timeout_ms = 5_000;
        config
    }

    pub fn app_state(&self, config: Config) -> AppState {
        AppState::new(config).unwrap()
    }
}

async fn bind() -> tokio::net::TcpListener {
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    tokio::net::TcpListener::bind(addr).await.unwrap()
}

async fn issue_access(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.broker_calls.fetch_add(1, Ordering::SeqCst);
    state.broker_auth.lock().unwrap().push(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );

    let container = body["container"].as_str().unwrap_or_default();
    if container.is_empty() {
        return (StatusCode::BAD_REQUEST, "container is required").into_response();
    }

    let (method, required_headers) = match body["operation"].as_str() {
        Some("upload") => ("PUT", json!({ "x-ms-blob-type": "BlockBlob" })),
        Some("download") => ("GET", json!({})),
        _ => return (StatusCode::BAD_REQUEST, "unknown operation").into_response(),
    };

    Json(json!({
        "sasUrl": format!("{}/{}?sv=2024-05-04&sp=rw&sig={}", state.storage_url, container, SIGNATURE),
        "expiresOn": "2030-01-01T00:00:00Z",
        "method": method,
        "headers": required_headers,
    }))
    .into_response()
}

async fn put_blob(
    State(state): State<Arc<MockState>>,
    Path((container, path)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.put_calls.fetch_add(1, Ordering::SeqCst);

    let delay = *state.put_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    if query.get("sig").map(String::as_str) != Some(SIGNATURE) {
        return (StatusCode::FORBIDDEN, "AuthenticationFailed").into_response();
    }
    if headers.get("x-ms-blob-type").and_then(|v| v.to_str().ok()) != Some("BlockBlob") {
        return (StatusCode::BAD_REQUEST, "MissingRequiredHeader").into_response();
    }
    let rejected = state
        .reject_put
        .lock()
        .unwrap()
        .as_deref()
        .is_some_and(|needle| path.contains(needle));
    if rejected {
        return (StatusCode::FORBIDDEN, "AuthorizationFailure").into_response();
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.blobs.lock().unwrap().insert(
        format!("{}/{}", container, path),
        StoredBlob {
            bytes: body,
            content_type,
        },
    );
    StatusCode::CREATED.into_response()
}

async fn get_blob(
    State(state): State<Arc<MockState>>,
    Path((container, path)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.get_calls.fetch_add(1, Ordering::SeqCst);

    if query.get("sig").map(String::as_str) != Some(SIGNATURE) {
        return (StatusCode::FORBIDDEN, "AuthenticationFailed").into_response();
    }
    match state.blob(&format!("{}/{}", container, path)) {
        Some(blob) => blob.bytes.into_response(),
        None => (StatusCode::NOT_FOUND, "BlobNotFound").into_response(),
    }
}

async fn register_attachments(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> Response {
    state.register_calls.fetch_add(1, Ordering::SeqCst);
    state.register_bodies.lock().unwrap().push(body.clone());

    let delay = *state.register_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let status = *state.register_status.lock().unwrap();
    if let Some(status) = status {
        return (status, "registration store unavailable").into_response();
    }

    let items = body["caseAttachesList"].as_array().cloned().unwrap_or_default();
    let mut ids = Vec::with_capacity(items.len());
    for item in &items {
        let id = format!("att-{}", state.next_id.fetch_add(1, Ordering::SeqCst));
        let case_id = item["caseId"].as_str().unwrap_or_default().to_string();

        // Rows come back without caseId, like the real list endpoint
        let row = json!({
            "id": id,
            "url": item["url"],
            "path": item["path"],
            "name": item["name"],
            "original": item["original"],
            "memo": item["memo"],
            "status": "WAIT",
            "type": "WEBAPPS",
            "createdAt": "2026-01-05 10:15:02",
        });
        state.attachments.lock().unwrap().push((case_id, row));
        ids.push(json!({ "id": id }));
    }

    if state.register_short.load(Ordering::SeqCst) {
        ids.pop();
    }
    Json(json!({ "caseAttachesList": ids })).into_response()
}

pub fn case_json(id: &str) -> Value {
    json!({
        "id": id,
        "number": "2026-0042",
        "productFamily": "Desk",
        "productName": "Editor",
        "productVersion": "4.2",
        "category": "Bug",
        "subCategory": null,
        "title": "Crash on save",
        "status": "OPEN",
        "createdAt": "2026-01-05 09:00:00",
        "updatedAt": "2026-01-05 09:30:00",
    })
}

async fn register_case(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.registered_cases.lock().unwrap().push(body);
    Json(json!({ "cases": { "id": "case-new" } })).into_response()
}

async fn list_cases(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let page = query
        .get("page")
        .and_then(|p| p.parse::<u32>().ok())
        .unwrap_or(0);
    state.listed_pages.lock().unwrap().push(page);

    Json(json!({
        "casesList": [case_json(KNOWN_CASE), case_json("case-43")],
        "casesCnt": 57,
    }))
    .into_response()
}

async fn view_case(Path(id): Path<String>) -> Response {
    if id != KNOWN_CASE {
        return (StatusCode::NOT_FOUND, "case not found").into_response();
    }
    Json(json!({
        "cases": case_json(&id),
        "caseStatementsList": [
            {
                "symptom": "Editor crashes on save",
                "needs": "A fix",
                "environments": { "os": "linux", "version": "4.2" },
                "createdAt": "2026-01-05 09:00:00",
                "updatedAt": "2026-01-05 09:00:00"
            }
        ],
        "caseResolutionsList": null,
    }))
    .into_response()
}

async fn list_attachments(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    let rows: Vec<Value> = state
        .attachments
        .lock()
        .unwrap()
        .iter()
        .filter(|(case_id, _)| *case_id == id)
        .map(|(_, row)| row.clone())
        .collect();
    Json(json!({ "caseAttachesList": rows })).into_response()
}
