//! Publisher - commits an extracted backup into a target repository.
//!
//! Works in a scratch directory that is removed when the run ends:
//! extract the archive, clone the target branch (falling back to the
//! default branch), replace `cvat_backup_project_<id>/`, commit and push.

use chrono::{DateTime, Utc};
use std::path::Path;
use tempfile::TempDir;
use tracing::{info, warn};

use super::{
    archive::{extract_zip, replace_dir},
    error::PublishResult,
    git::{GitError, GitOps},
    remote::AuthenticatedRemote,
};
use crate::config::PublishTarget;

/// Result of a publish run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// A commit was created and pushed.
    Pushed { commit_message: String },
    /// The repository already held identical content; nothing was pushed.
    NothingToCommit,
}

/// Directory inside the target repository that holds a project's backup.
pub fn project_dir_name(project_id: u64) -> String {
    format!("cvat_backup_project_{}", project_id)
}

/// Conventional-commit message for a backup.
pub fn commit_message(project_id: u64, zip_name: &str, at: DateTime<Utc>) -> String {
    format!(
        "chore(backup): add cvat project {} backup {} @ {}",
        project_id,
        zip_name,
        at.format("%Y-%m-%dT%H:%M:%SZ")
    )
}

/// Publishes backups into one target repository and branch.
pub struct Publisher<G: GitOps> {
    git: G,
    target: PublishTarget,
}

impl<G: GitOps> Publisher<G> {
    pub fn new(git: G, target: PublishTarget) -> Self {
        Self { git, target }
    }

    /// Publish `zip_path` using a fresh scratch directory.
    pub fn publish(&self, project_id: u64, zip_path: &Path) -> PublishResult<PublishOutcome> {
        let scratch = TempDir::new()?;
        self.publish_in(scratch.path(), project_id, zip_path, Utc::now())
    }

    /// Publish `zip_path` using `scratch` for extraction and the clone.
    ///
    /// `now` stamps the commit message.
    pub fn publish_in(
        &self,
        scratch: &Path,
        project_id: u64,
        zip_path: &Path,
        now: DateTime<Utc>,
    ) -> PublishResult<PublishOutcome> {
        let remote = AuthenticatedRemote::new(
            &self.target.repo_url,
            &self.target.git_username,
            &self.target.git_token,
        )?;

        let extract_dir = scratch.join("extracted");
        extract_zip(zip_path, &extract_dir)?;

        let clone_dir = scratch.join("repo");
        self.clone_target(&remote, &clone_dir)?;

        replace_dir(&extract_dir, &clone_dir.join(project_dir_name(project_id)))?;

        let redact = |e: GitError| remote.redact_error(e);

        self.git.add_all(&clone_dir).map_err(redact)?;
        let status = self.git.status_porcelain(&clone_dir).map_err(redact)?;
        if String::from_utf8_lossy(&status.stdout).trim().is_empty() {
            info!("No changes to commit; skipping commit and push");
            return Ok(PublishOutcome::NothingToCommit);
        }

        let zip_name = zip_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let message = commit_message(project_id, &zip_name, now);

        self.git.commit(&clone_dir, &message).map_err(redact)?;
        self.git
            .push(&clone_dir, "origin", &self.target.branch)
            .map_err(redact)?;

        info!(
            repo = %self.target.repo_url,
            branch = %self.target.branch,
            "Backup committed and pushed"
        );
        Ok(PublishOutcome::Pushed {
            commit_message: message,
        })
    }

    /// Clone the target branch, or the default branch plus a local checkout
    /// of the target branch when the remote does not have it yet.
    fn clone_target(&self, remote: &AuthenticatedRemote, clone_dir: &Path) -> PublishResult<()> {
        let branch = &self.target.branch;

        match self.git.clone_branch(remote.url(), branch, clone_dir) {
            Ok(_) => return Ok(()),
            Err(GitError::NonZeroExit { .. }) => {
                warn!(
                    branch = %branch,
                    "Remote branch not found; cloning default branch and creating it locally"
                );
            }
            Err(e) => return Err(remote.redact_error(e).into()),
        }

        if clone_dir.exists() {
            std::fs::remove_dir_all(clone_dir)?;
        }
        self.git
            .clone_default(remote.url(), clone_dir)
            .map_err(|e| remote.redact_error(e))?;

        match self.git.checkout(clone_dir, branch) {
            Ok(_) => Ok(()),
            Err(GitError::NonZeroExit { .. }) => {
                self.git
                    .checkout_new_branch(clone_dir, branch)
                    .map_err(|e| remote.redact_error(e))?;
                Ok(())
            }
            Err(e) => Err(remote.redact_error(e).into()),
        }
    }
}
