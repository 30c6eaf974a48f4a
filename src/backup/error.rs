//! Backup client error types.

use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while exporting or downloading a project backup.
#[derive(Error, Diagnostic, Debug)]
pub enum BackupError {
    #[error("HTTP request failed: {0}")]
    #[diagnostic(
        code(cvat_backup::backup::http),
        help("Check that CVAT_HOST is reachable from this machine.")
    )]
    Http(#[from] reqwest::Error),

    #[error("CVAT API error ({status}): {message}")]
    #[diagnostic(code(cvat_backup::backup::api_error))]
    Api { status: u16, message: String },

    #[error("Invalid response from CVAT: {message}")]
    #[diagnostic(code(cvat_backup::backup::invalid_response))]
    InvalidResponse { message: String },

    #[error("Invalid URL '{url}': {reason}")]
    #[diagnostic(code(cvat_backup::backup::invalid_url))]
    InvalidUrl { url: String, reason: String },

    #[error("Unrecognized export status '{status}'")]
    #[diagnostic(
        code(cvat_backup::backup::unknown_status),
        help("The CVAT server reported a request status this tool does not know about.")
    )]
    UnknownStatus { status: String },

    #[error("Export failed (request {rq_id}): {message}")]
    #[diagnostic(code(cvat_backup::backup::export_failed))]
    ExportFailed { rq_id: String, message: String },

    #[error("Export finished but no result URL was returned (request {rq_id})")]
    #[diagnostic(code(cvat_backup::backup::missing_result_url))]
    MissingResultUrl { rq_id: String },

    #[error("Export still pending after {waited_secs}s (request {rq_id})")]
    #[diagnostic(
        code(cvat_backup::backup::poll_timeout),
        help("Increase POLL_TIMEOUT_SECS or leave it unset to wait indefinitely.")
    )]
    PollTimeout { rq_id: String, waited_secs: u64 },

    #[error("IO error: {0}")]
    #[diagnostic(code(cvat_backup::backup::io))]
    Io(#[from] std::io::Error),
}

pub type BackupResult<T> = Result<T, BackupError>;
