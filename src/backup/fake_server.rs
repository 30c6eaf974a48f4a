//! In-process stand-in for the CVAT export endpoints used by tests.

use axum::{
    Json, Router,
    extract::{Path as UrlPath, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use crate::config::{Secret, Settings};

// "admin:hunter2"
pub const EXPECTED_AUTH: &str = "Basic YWRtaW46aHVudGVyMg==";
pub const ARCHIVE_BYTES: &[u8] = b"PK\x03\x04 fake project archive bytes";

/// In-process stand-in for the CVAT export endpoints.
pub struct FakeCvat {
    pub base_url: String,
    pub statuses: Mutex<VecDeque<&'static str>>,
    pub result_url: Option<String>,
    pub fail_message: Option<String>,
    pub exports: AtomicUsize,
    pub polls: AtomicUsize,
    pub downloads: AtomicUsize,
    pub archive: Vec<u8>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == EXPECTED_AUTH)
}

async fn start_export(
    State(cvat): State<Arc<FakeCvat>>,
    UrlPath(id): UrlPath<u64>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if id != 42 {
        return (StatusCode::NOT_FOUND, "Not found.").into_response();
    }
    cvat.exports.fetch_add(1, Ordering::SeqCst);
    (StatusCode::ACCEPTED, Json(json!({ "rq_id": "action=backup&target=project&id=42" })))
        .into_response()
}

async fn request_status(
    State(cvat): State<Arc<FakeCvat>>,
    UrlPath(_rq_id): UrlPath<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    cvat.polls.fetch_add(1, Ordering::SeqCst);

    let mut statuses = cvat.statuses.lock().unwrap();
    let status = if statuses.len() > 1 {
        statuses.pop_front().unwrap()
    } else {
        statuses.front().copied().unwrap_or("queued")
    };

    let body = match status {
        "finished" => json!({ "status": status, "message": "", "result_url": cvat.result_url }),
        "failed" => json!({ "status": status, "message": cvat.fail_message, "result_url": null }),
        _ => json!({ "status": status, "message": "", "result_url": null }),
    };
    Json(body).into_response()
}

async fn download(State(cvat): State<Arc<FakeCvat>>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    cvat.downloads.fetch_add(1, Ordering::SeqCst);
    cvat.archive.clone().into_response()
}

/// Serve the fake on an ephemeral port. Statuses are handed out in order;
/// the last one repeats.
pub async fn spawn_fake_cvat(
    statuses: Vec<&'static str>,
    result_path: Option<&str>,
    fail_message: Option<&str>,
) -> Arc<FakeCvat> {
    spawn_fake_cvat_serving(statuses, result_path, fail_message, ARCHIVE_BYTES.to_vec()).await
}

/// Like [`spawn_fake_cvat`], serving `archive` as the download.
pub async fn spawn_fake_cvat_serving(
    statuses: Vec<&'static str>,
    result_path: Option<&str>,
    fail_message: Option<&str>,
    archive: Vec<u8>,
) -> Arc<FakeCvat> {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let cvat = Arc::new(FakeCvat {
        result_url: result_path.map(|p| format!("{}{}", base_url, p)),
        base_url,
        statuses: Mutex::new(statuses.into()),
        fail_message: fail_message.map(str::to_string),
        exports: AtomicUsize::new(0),
        polls: AtomicUsize::new(0),
        downloads: AtomicUsize::new(0),
        archive,
    });

    let app = Router::new()
        .route("/api/projects/{id}/backup/export", post(start_export))
        .route("/api/requests/{rq_id}", get(request_status))
        .route("/files/project.zip", get(download))
        .with_state(cvat.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    cvat
}

/// Settings pointing at a fake server, polling every 10ms.
pub fn settings_for(base_url: &str, save_dir: PathBuf) -> Settings {
    Settings {
        host: base_url.parse().unwrap(),
        username: "admin".to_string(),
        password: Secret::new("hunter2"),
        project_id: 42,
        save_dir,
        poll_interval: Duration::from_millis(10),
        poll_timeout: None,
        publish: None,
    }
}
