#![allow(dead_code)]

use axum::{
    Form, Json, Router,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use esa_attachments::{Client, ClientConfig};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const TEST_TOKEN: &str = "test-token";

#[derive(Debug, Clone)]
pub struct ReceivedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct StubOptions {
    /// Status returned by the object storage endpoint
    pub upload_status: StatusCode,
    /// Give every issued policy its own object key and URL
    pub unique_keys: bool,
    /// Raw body returned by the policy endpoint instead of a valid policy
    pub policy_body: Option<&'static str>,
}

impl Default for StubOptions {
    fn default() -> Self {
        Self {
            upload_status: StatusCode::NO_CONTENT,
            unique_keys: false,
            policy_body: None,
        }
    }
}

pub struct StubState {
    pub origin: String,
    pub options: StubOptions,
    pub issued: AtomicUsize,
    pub policy_requests: Mutex<Vec<HashMap<String, String>>>,
    pub policy_auth: Mutex<Vec<Option<String>>>,
    pub uploads: Mutex<Vec<Vec<ReceivedPart>>>,
    pub upload_auth: Mutex<Vec<Option<String>>>,
}

/// esa API and object storage on one local listener.
///
/// `POST /v1/teams/:team/attachments/policies` issues policies pointing at
/// `POST /ep`, which records the multipart parts it receives.
pub struct StubServer {
    pub origin: String,
    pub state: Arc<StubState>,
}

impl StubServer {
    pub async fn spawn(options: StubOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let origin = format!("http://{}", listener.local_addr().unwrap());

        let state = Arc::new(StubState {
            origin: origin.clone(),
            options,
            issued: AtomicUsize::new(0),
            policy_requests: Mutex::new(Vec::new()),
            policy_auth: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            upload_auth: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/teams/:team/attachments/policies", post(issue_policy))
            .route("/ep", post(receive_upload))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { origin, state }
    }

    pub fn base_url(&self) -> String {
        format!("{}/v1/teams", self.origin)
    }

    pub fn client(&self) -> Client {
        Client::new(
            ClientConfig::default()
                .with_base_url(self.base_url())
                .with_access_token(TEST_TOKEN),
        )
        .unwrap()
    }

    pub fn policy_requests(&self) -> Vec<HashMap<String, String>> {
        self.state.policy_requests.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<Vec<ReceivedPart>> {
        self.state.uploads.lock().unwrap().clone()
    }
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn issue_policy(
    State(state): State<Arc<StubState>>,
    Path(team): Path<String>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if team.is_empty() {
        return StatusCode::NOT_FOUND.into_response();
    }

    state.policy_auth.lock().unwrap().push(authorization(&headers));
    state.policy_requests.lock().unwrap().push(form.clone());

    if let Some(body) = state.options.policy_body {
        return ([(header::CONTENT_TYPE, "application/json")], body).into_response();
    }

    let n = state.issued.fetch_add(1, Ordering::SeqCst) + 1;
    let name = form.get("name").cloned().unwrap_or_default();
    let key = if state.options.unique_keys {
        format!("{n}/{name}")
    } else {
        name.clone()
    };

    Json(json!({
        "attachment": {
            "endpoint": format!("{}/ep", state.origin),
            "url": format!("{}/pub/{}", state.origin, key),
        },
        "form": {
            "AWSAccessKeyId": "AKIAEXAMPLE",
            "signature": "c2lnbmF0dXJl",
            "policy": "eyJleHBpcmF0aW9uIjoiMjAyNi0wMS0wMVQwMDowMDowMFoifQ==",
            "key": format!("uploads/{key}"),
            "Content-Type": form.get("type").cloned().unwrap_or_default(),
            "Cache-Control": "max-age=31536000",
            "Content-Disposition": format!("inline; filename=\"{name}\""),
            "acl": "public-read",
        }
    }))
    .into_response()
}

async fn receive_upload(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> StatusCode {
    state.upload_auth.lock().unwrap().push(authorization(&headers));

    let mut parts = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        parts.push(ReceivedPart {
            name,
            file_name,
            data,
        });
    }
    state.uploads.lock().unwrap().push(parts);

    state.options.upload_status
}

/// Writes `content` to `<tempdir>/<name>` and returns the directory guard and path.
pub fn write_file(name: &str, content: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    (dir, path)
}
