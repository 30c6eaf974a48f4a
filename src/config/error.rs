//! Configuration error types.

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while validating settings at startup.
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be set")]
    #[diagnostic(
        code(cvat_backup::config::missing),
        help("Pass the matching command-line flag or set the environment variable (a .env file works too).")
    )]
    Missing { var: &'static str },

    #[error("{var} must be set when pushing backups to a repo")]
    #[diagnostic(
        code(cvat_backup::config::incomplete_publish),
        help("TARGET_REPO, GIT_USERNAME and GIT_TOKEN are required together.")
    )]
    IncompletePublish { var: &'static str },

    #[error("Invalid CVAT host '{host}': {reason}")]
    #[diagnostic(code(cvat_backup::config::invalid_host))]
    InvalidHost { host: String, reason: String },

    #[error("Invalid value for {var}: {message}")]
    #[diagnostic(code(cvat_backup::config::invalid_value))]
    InvalidValue { var: &'static str, message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
