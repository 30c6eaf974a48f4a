//! Publish error types.

use miette::Diagnostic;
use thiserror::Error;

use super::git::GitError;

/// Errors that can occur while publishing a backup into a repository.
#[derive(Error, Diagnostic, Debug)]
pub enum PublishError {
    #[error("Only https target repository URLs are supported for authenticated push: {url}")]
    #[diagnostic(
        code(cvat_backup::publish::unsupported_remote),
        help("Use the https clone URL of the repository, e.g. https://github.com/owner/repo.git")
    )]
    UnsupportedRemote { url: String },

    #[error("Invalid target repository URL '{url}': {reason}")]
    #[diagnostic(code(cvat_backup::publish::invalid_remote))]
    InvalidRemote { url: String, reason: String },

    #[error("Git error: {0}")]
    #[diagnostic(code(cvat_backup::publish::git))]
    Git(#[from] GitError),

    #[error("Archive error: {0}")]
    #[diagnostic(code(cvat_backup::publish::archive))]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    #[diagnostic(code(cvat_backup::publish::io))]
    Io(#[from] std::io::Error),
}

pub type PublishResult<T> = Result<T, PublishError>;
