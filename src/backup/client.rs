//! HTTP client for the CVAT project backup workflow.
//!
//! Starts an export, polls the request until it reaches a terminal state and
//! streams the resulting archive to disk. Every call is authenticated with
//! HTTP basic auth. Nothing is retried: the first error aborts the backup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;
use tracing::{debug, info};
use url::Url;

use super::error::{BackupError, BackupResult};
use super::status::{ExportStarted, ExportStatus, RequestDetails};
use crate::config::{Secret, Settings};

/// File name of the downloaded archive for a project.
pub fn archive_file_name(project_id: u64) -> String {
    format!("project_{}_backup.zip", project_id)
}

/// Install the rustls crypto provider reqwest is built against.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_crypto() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Client for the export endpoints of one CVAT server.
pub struct BackupClient {
    host: Url,
    username: String,
    password: Secret,
    poll_interval: Duration,
    poll_timeout: Option<Duration>,
    client: Client,
}

impl BackupClient {
    pub fn new(settings: &Settings) -> Self {
        init_crypto();

        Self {
            host: settings.host.clone(),
            username: settings.username.clone(),
            password: settings.password.clone(),
            poll_interval: settings.poll_interval,
            poll_timeout: settings.poll_timeout,
            client: Client::new(),
        }
    }

    /// Run the full backup: export, wait, download.
    ///
    /// Returns the path of `project_<id>_backup.zip` under `save_dir`,
    /// creating the directory when needed.
    pub async fn backup_project(&self, project_id: u64, save_dir: &Path) -> BackupResult<PathBuf> {
        tokio::fs::create_dir_all(save_dir).await?;

        let rq_id = self.start_export(project_id).await?;
        let result_url = self.wait_for_export(&rq_id).await?;

        let zip_path = save_dir.join(archive_file_name(project_id));
        self.download(&result_url, &zip_path).await?;

        info!(path = %zip_path.display(), "Backup saved");
        Ok(zip_path)
    }

    /// Ask the server to start a backup export and return the request id.
    pub async fn start_export(&self, project_id: u64) -> BackupResult<String> {
        let url = self.endpoint(&format!("/api/projects/{}/backup/export", project_id))?;

        let response = self
            .client
            .post(url)
            .basic_auth(&self.username, Some(self.password.expose()))
            .send()
            .await?;

        let started: ExportStarted = Self::handle_response(response).await?;
        info!(rq_id = %started.rq_id, project_id, "Export started");
        Ok(started.rq_id)
    }

    /// Fetch the current state of an export request.
    pub async fn request_details(&self, rq_id: &str) -> BackupResult<RequestDetails> {
        let url = self.endpoint(&format!("/api/requests/{}", rq_id))?;

        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(self.password.expose()))
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Poll an export request until it finishes or fails.
    ///
    /// Sleeps a fixed interval between checks. Returns the result URL once
    /// the export is finished; never polls again after a terminal state.
    pub async fn wait_for_export(&self, rq_id: &str) -> BackupResult<String> {
        let started = Instant::now();

        loop {
            let details = self.request_details(rq_id).await?;
            let status = ExportStatus::from_wire(&details.status)?;
            info!(%status, "Export status");

            match status {
                ExportStatus::Finished => {
                    info!("Export completed");
                    return details
                        .result_url
                        .filter(|u| !u.is_empty())
                        .ok_or_else(|| BackupError::MissingResultUrl {
                            rq_id: rq_id.to_string(),
                        });
                }
                ExportStatus::Failed => {
                    return Err(BackupError::ExportFailed {
                        rq_id: rq_id.to_string(),
                        message: details
                            .message
                            .filter(|m| !m.is_empty())
                            .unwrap_or_else(|| "no details reported".to_string()),
                    });
                }
                ExportStatus::Pending => {}
            }

            if let Some(timeout) = self.poll_timeout {
                if started.elapsed() >= timeout {
                    return Err(BackupError::PollTimeout {
                        rq_id: rq_id.to_string(),
                        waited_secs: started.elapsed().as_secs(),
                    });
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Stream `url` into `dest`, overwriting any existing file.
    pub async fn download(&self, url: &str, dest: &Path) -> BackupResult<u64> {
        let url = Url::parse(url).map_err(|e| BackupError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        info!(%url, "Downloading backup");

        let mut response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(self.password.expose()))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(bytes = written, path = %dest.display(), "Download finished");
        Ok(written)
    }

    fn endpoint(&self, path: &str) -> BackupResult<Url> {
        let raw = format!("{}{}", self.host.as_str().trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|e| BackupError::InvalidUrl {
            url: raw,
            reason: e.to_string(),
        })
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> BackupResult<T> {
        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| BackupError::InvalidResponse {
                    message: e.to_string(),
                })
        } else {
            Err(Self::api_error(response).await)
        }
    }

    async fn api_error(response: Response) -> BackupError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        BackupError::Api { status, message }
    }
}
