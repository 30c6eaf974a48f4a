use miette::Diagnostic;
use thiserror::Error;

use crate::backup::BackupError;
use crate::config::ConfigError;
use crate::publish::PublishError;

/// Top-level error for a backup run.
#[derive(Error, Diagnostic, Debug)]
pub enum AppError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Backup(#[from] BackupError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Publish(#[from] PublishError),
}

pub type AppResult<T> = Result<T, AppError>;
