//! Shared utilities for integration tests.
//!
//! Starts an in-process mock of the versioned blob store: a raw-content
//! endpoint under `/raw` and a contents API under `/api`, sharing one
//! repository state.

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use base64::prelude::{Engine as _, BASE64_STANDARD};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use storefront_config::config::ResolverSettings;
use storefront_config::tenant::TenantCoordinates;
use storefront_config::StoreConfig;

pub const OWNER: &str = "acme";
pub const REPO: &str = "shop";
pub const TOKEN: &str = "test-token";
pub const SEED_SHA: &str = "sha-seed";

/// Repository state behind the mock.
#[derive(Debug, Default)]
pub struct MockRepo {
    /// Stored `config.json` text.
    pub content: Option<String>,
    pub sha: Option<String>,
    pub writes: u32,
    pub raw_reads: u32,
    /// Upcoming raw reads to fail with 503.
    pub fail_reads: u32,
    /// Respond to every write with this status and body.
    pub reject_writes: Option<(u16, String)>,
    /// Body returned for accepted writes instead of the usual JSON.
    pub accepted_body: Option<String>,
    pub last_raw_path: Option<String>,
    /// Every raw read path, in arrival order.
    pub raw_paths: Vec<String>,
    pub last_cache_buster: Option<String>,
    pub last_message: Option<String>,
    pub last_branch: Option<String>,
}

#[derive(Clone)]
pub struct MockStore {
    pub repo: Arc<Mutex<MockRepo>>,
    pub addr: SocketAddr,
}

type Shared = Arc<Mutex<MockRepo>>;

/// Start the mock on an ephemeral port.
pub async fn start_mock_store() -> MockStore {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let repo: Shared = Arc::new(Mutex::new(MockRepo::default()));

    let app = Router::new()
        .route("/raw/{owner}/{repo}/{branch}/config.json", get(raw_read))
        .route(
            "/api/repos/{owner}/{repo}/contents/config.json",
            get(read_metadata).put(write_content),
        )
        .with_state(repo.clone());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockStore { repo, addr }
}

impl MockStore {
    pub fn raw_host(&self) -> String {
        format!("http://{}/raw", self.addr)
    }

    pub fn api_host(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Settings pointing every endpoint at the mock, with an in-memory cache
    /// and fast retries.
    pub fn settings(&self) -> ResolverSettings {
        let mut settings = ResolverSettings::default();
        settings.remote.raw_host = self.raw_host();
        settings.remote.api_host = self.api_host();
        settings.remote.default_config_url =
            format!("{}/default/repo/main/config.json", self.raw_host());
        settings.cache.path = None;
        settings.retries.base_delay_ms = 10;
        settings.retries.max_delay_ms = 20;
        settings
    }

    pub fn coordinates(&self) -> TenantCoordinates {
        TenantCoordinates::new(OWNER, REPO).with_token(TOKEN)
    }

    /// Store `config` as if written earlier by someone else.
    pub fn seed(&self, config: &StoreConfig) {
        let mut repo = self.repo.lock().unwrap();
        repo.content = Some(serde_json::to_string_pretty(config).unwrap());
        repo.sha = Some(SEED_SHA.to_string());
    }

    /// Store arbitrary text as the blob.
    pub fn seed_raw(&self, text: &str) {
        let mut repo = self.repo.lock().unwrap();
        repo.content = Some(text.to_string());
        repo.sha = Some(SEED_SHA.to_string());
    }

    /// Decode the stored blob.
    pub fn stored(&self) -> Option<StoreConfig> {
        let repo = self.repo.lock().unwrap();
        repo.content
            .as_deref()
            .map(|text| serde_json::from_str(text).unwrap())
    }

    pub fn with_repo<T>(&self, f: impl FnOnce(&mut MockRepo) -> T) -> T {
        f(&mut self.repo.lock().unwrap())
    }
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

async fn raw_read(
    State(repo): State<Shared>,
    Path((owner, name, branch)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut repo = repo.lock().unwrap();
    repo.raw_reads += 1;
    let path = format!("{}/{}/{}", owner, name, branch);
    repo.raw_paths.push(path.clone());
    repo.last_raw_path = Some(path);
    repo.last_cache_buster = query.get("t").cloned();

    if repo.fail_reads > 0 {
        repo.fail_reads -= 1;
        return (StatusCode::SERVICE_UNAVAILABLE, "unavailable").into_response();
    }
    match &repo.content {
        Some(text) => (StatusCode::OK, text.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "404: Not Found").into_response(),
    }
}

async fn read_metadata(State(repo): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Bad credentials");
    }
    let repo = repo.lock().unwrap();
    match (&repo.content, &repo.sha) {
        (Some(text), Some(sha)) => Json(json!({
            "sha": sha,
            "content": BASE64_STANDARD.encode(text.as_bytes()),
        }))
        .into_response(),
        _ => message(StatusCode::NOT_FOUND, "Not Found"),
    }
}

async fn write_content(
    State(repo): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Bad credentials");
    }
    let mut repo = repo.lock().unwrap();

    if let Some((status, text)) = repo.reject_writes.clone() {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, text).into_response();
    }

    let given = body.get("sha").and_then(Value::as_str);
    match (repo.sha.as_deref(), given) {
        (Some(current), Some(given)) if current != given => {
            return message(
                StatusCode::CONFLICT,
                &format!("config.json does not match {}", given),
            );
        }
        (Some(_), None) => {
            return message(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid request.\n\n\"sha\" wasn't supplied.",
            );
        }
        (None, Some(given)) => {
            return message(
                StatusCode::CONFLICT,
                &format!("config.json does not match {}", given),
            );
        }
        _ => {}
    }

    let decoded = body
        .get("content")
        .and_then(Value::as_str)
        .and_then(|c| BASE64_STANDARD.decode(c).ok())
        .and_then(|bytes| String::from_utf8(bytes).ok());
    let Some(text) = decoded else {
        return message(StatusCode::UNPROCESSABLE_ENTITY, "content is not valid Base64");
    };

    let created = repo.content.is_none();
    repo.writes += 1;
    let sha = format!("sha-{}", repo.writes);
    repo.content = Some(text);
    repo.sha = Some(sha.clone());
    repo.last_message = body.get("message").and_then(Value::as_str).map(String::from);
    repo.last_branch = body.get("branch").and_then(Value::as_str).map(String::from);

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    if let Some(body) = repo.accepted_body.clone() {
        return (status, body).into_response();
    }
    (
        status,
        Json(json!({
            "content": { "sha": sha },
            "commit": { "sha": format!("commit-{}", repo.writes) },
        })),
    )
        .into_response()
}
