//! Runtime settings for a backup run.
//!
//! Settings are assembled once at startup from command-line flags and
//! environment variables, validated, and then passed by reference to the
//! backup client and publisher. Nothing below this module reads the
//! environment.

mod error;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub use error::{ConfigError, ConfigResult};

/// Default branch used when publishing without an explicit target branch.
pub const DEFAULT_BRANCH: &str = "main";

/// Default delay between two export status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// A credential that must never end up in logs or error output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw credential. Only call this where the value is sent over the wire.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Unvalidated values as collected from flags and environment.
#[derive(Debug, Default, Clone)]
pub struct RawSettings {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub project_id: Option<u64>,
    pub save_dir: Option<PathBuf>,
    pub target_repo: Option<String>,
    pub target_branch: Option<String>,
    pub git_username: Option<String>,
    pub git_token: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub poll_timeout_secs: Option<u64>,
}

/// Where and how to push the extracted backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    pub repo_url: String,
    pub branch: String,
    pub git_username: String,
    pub git_token: Secret,
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: Url,
    pub username: String,
    pub password: Secret,
    pub project_id: u64,
    pub save_dir: PathBuf,
    pub poll_interval: Duration,
    /// `None` keeps polling until the export reaches a terminal state.
    pub poll_timeout: Option<Duration>,
    pub publish: Option<PublishTarget>,
}

impl Settings {
    /// Validate raw values into settings.
    ///
    /// The CVAT connection values are always required. Publish values are
    /// optional as a group: once any of the repository, git username or git
    /// token is given, all three must be.
    pub fn from_raw(raw: RawSettings) -> ConfigResult<Self> {
        let host = required(raw.host, "CVAT_HOST")?;
        let username = required(raw.username, "CVAT_USERNAME")?;
        let password = required(raw.password, "CVAT_PASSWORD")?;
        let project_id = raw
            .project_id
            .ok_or(ConfigError::Missing { var: "CVAT_PROJECT_ID" })?;
        let save_dir = raw
            .save_dir
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::Missing { var: "SAVE_DIR" })?;

        let host = parse_host(&host)?;

        let poll_interval = match raw.poll_interval_secs {
            Some(0) => {
                return Err(ConfigError::InvalidValue {
                    var: "POLL_INTERVAL_SECS",
                    message: "must be greater than zero".to_string(),
                });
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_POLL_INTERVAL,
        };
        let poll_timeout = raw.poll_timeout_secs.map(Duration::from_secs);

        let publish = publish_target(
            raw.target_repo,
            raw.target_branch,
            raw.git_username,
            raw.git_token,
        )?;

        Ok(Self {
            host,
            username,
            password: Secret::new(password),
            project_id,
            save_dir,
            poll_interval,
            poll_timeout,
            publish,
        })
    }
}

fn required(value: Option<String>, var: &'static str) -> ConfigResult<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing { var })
}

fn parse_host(host: &str) -> ConfigResult<Url> {
    let url = Url::parse(host).map_err(|e| ConfigError::InvalidHost {
        host: host.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidHost {
            host: host.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

fn publish_target(
    repo: Option<String>,
    branch: Option<String>,
    git_username: Option<String>,
    git_token: Option<String>,
) -> ConfigResult<Option<PublishTarget>> {
    let repo = repo.filter(|v| !v.is_empty());
    let git_username = git_username.filter(|v| !v.is_empty());
    let git_token = git_token.filter(|v| !v.is_empty());

    if repo.is_none() && git_username.is_none() && git_token.is_none() {
        return Ok(None);
    }

    let repo_url = repo.ok_or(ConfigError::IncompletePublish { var: "TARGET_REPO" })?;
    let git_token = git_token.ok_or(ConfigError::IncompletePublish { var: "GIT_TOKEN" })?;
    let git_username =
        git_username.ok_or(ConfigError::IncompletePublish { var: "GIT_USERNAME" })?;

    let branch = branch.unwrap_or_else(|| DEFAULT_BRANCH.to_string());
    if branch.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            var: "TARGET_BRANCH",
            message: "branch name cannot be empty".to_string(),
        });
    }

    Ok(Some(PublishTarget {
        repo_url,
        branch,
        git_username,
        git_token: Secret::new(git_token),
    }))
}
