//! Wire types for the CVAT export request endpoints.

use serde::Deserialize;
use std::fmt;

use super::error::{BackupError, BackupResult};

/// State of a server-side export job, as far as this tool cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    Pending,
    Finished,
    Failed,
}

impl ExportStatus {
    /// Map a raw CVAT request status onto the closed set of states.
    ///
    /// CVAT reports `queued` and `started` while the job is in flight.
    /// Anything outside the known values is an error instead of another
    /// round of polling.
    pub fn from_wire(raw: &str) -> BackupResult<Self> {
        match raw {
            "queued" | "started" => Ok(Self::Pending),
            "finished" => Ok(Self::Finished),
            "failed" => Ok(Self::Failed),
            other => Err(BackupError::UnknownStatus {
                status: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Finished => "finished",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Response of `POST /api/projects/{id}/backup/export`.
#[derive(Debug, Deserialize)]
pub struct ExportStarted {
    pub rq_id: String,
}

/// Response of `GET /api/requests/{rq_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestDetails {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result_url: Option<String>,
}
