pub mod error;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, error::ErrorKind};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::backup::BackupClient;
use crate::config::{ConfigError, DEFAULT_BRANCH, DEFAULT_POLL_INTERVAL, RawSettings, Settings};
use crate::publish::{GitOps, PublishOutcome, Publisher, RealGit};
use error::AppResult;

#[derive(Parser, Debug)]
#[command(name = "cvat-backup")]
#[command(
    author,
    version,
    about = "Back up a CVAT project and optionally commit it into a git repository",
    long_about = None
)]
pub struct Cli {
    /// CVAT host URL
    #[arg(long, env = "CVAT_HOST")]
    pub host: Option<String>,

    /// CVAT username
    #[arg(long, env = "CVAT_USERNAME")]
    pub username: Option<String>,

    /// CVAT password
    #[arg(long, env = "CVAT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Project ID to back up
    #[arg(long, env = "CVAT_PROJECT_ID")]
    pub project_id: Option<u64>,

    /// Directory to save the backup archive in
    #[arg(long, env = "SAVE_DIR")]
    pub save_dir: Option<PathBuf>,

    /// HTTPS URL of the repository to commit the backup into
    #[arg(long, env = "TARGET_REPO")]
    pub target_repo: Option<String>,

    /// Branch of the target repository
    #[arg(long, env = "TARGET_BRANCH", default_value = DEFAULT_BRANCH)]
    pub target_branch: String,

    /// Username for git authentication (used with the token)
    #[arg(long, env = "GIT_USERNAME")]
    pub git_username: Option<String>,

    /// Personal access token for git authentication
    #[arg(long, env = "GIT_TOKEN", hide_env_values = true)]
    pub git_token: Option<String>,

    /// Seconds between export status checks
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    pub poll_interval: u64,

    /// Give up after this many seconds of waiting (default: wait forever)
    #[arg(long, env = "POLL_TIMEOUT_SECS")]
    pub poll_timeout: Option<u64>,
}

impl From<Cli> for RawSettings {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            username: cli.username,
            password: cli.password,
            project_id: cli.project_id,
            save_dir: cli.save_dir,
            target_repo: cli.target_repo,
            target_branch: Some(cli.target_branch),
            git_username: cli.git_username,
            git_token: cli.git_token,
            poll_interval_secs: Some(cli.poll_interval),
            poll_timeout_secs: cli.poll_timeout,
        }
    }
}

/// What a completed run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub archive: PathBuf,
    /// `None` on the download-only path.
    pub publish: Option<PublishOutcome>,
}

/// Initialize tracing subscriber with env filter, logging to stderr.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cvat_backup=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Parse flags and environment, then run the backup.
///
/// Invalid settings exit with a usage error before any network call.
pub async fn run() -> AppResult<RunSummary> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    let settings = match Settings::from_raw(cli.into()) {
        Ok(settings) => settings,
        Err(e) => {
            let kind = match e {
                ConfigError::Missing { .. } | ConfigError::IncompletePublish { .. } => {
                    ErrorKind::MissingRequiredArgument
                }
                _ => ErrorKind::ValueValidation,
            };
            Cli::command().error(kind, e.to_string()).exit()
        }
    };

    execute(&settings, RealGit::new()).await
}

/// Download the backup and, when a publish target is configured, commit it.
pub async fn execute<G: GitOps>(settings: &Settings, git: G) -> AppResult<RunSummary> {
    let client = BackupClient::new(settings);
    let archive = client
        .backup_project(settings.project_id, &settings.save_dir)
        .await?;

    let publish = match &settings.publish {
        Some(target) => {
            info!(repo = %target.repo_url, branch = %target.branch, "Publishing backup");
            let publisher = Publisher::new(git, target.clone());
            Some(publisher.publish(settings.project_id, &archive)?)
        }
        None => None,
    };

    Ok(RunSummary { archive, publish })
}
