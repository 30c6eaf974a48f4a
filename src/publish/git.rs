//! Git operations for publishing backups.
//!
//! This module provides a trait-based abstraction over git commands
//! so the publisher can be tested without real repositories.

use miette::Diagnostic;
use std::path::Path;
use std::process::{Command, Output};
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

/// Errors that can occur during git operations.
#[derive(Error, Diagnostic, Debug)]
pub enum GitError {
    #[error("Git command failed: {0}")]
    #[diagnostic(code(cvat_backup::publish::git::command_failed))]
    CommandFailed(String),

    #[error("Git command returned non-zero exit code {code}: {output}")]
    #[diagnostic(code(cvat_backup::publish::git::non_zero_exit))]
    NonZeroExit { code: i32, output: String },

    #[error("Git not installed or not in PATH")]
    #[diagnostic(
        code(cvat_backup::publish::git::not_found),
        help("Publishing to a repository requires the git command-line client.")
    )]
    GitNotFound,
}

/// Trait for git operations. Can be mocked in tests.
#[cfg_attr(test, automock)]
pub trait GitOps {
    /// Clone a single named branch of `url` into `dest`.
    fn clone_branch(&self, url: &str, branch: &str, dest: &Path) -> Result<Output, GitError>;

    /// Clone the default branch of `url` into `dest`.
    fn clone_default(&self, url: &str, dest: &Path) -> Result<Output, GitError>;

    /// Check out an existing branch.
    fn checkout(&self, path: &Path, branch: &str) -> Result<Output, GitError>;

    /// Create and check out a new branch.
    fn checkout_new_branch(&self, path: &Path, branch: &str) -> Result<Output, GitError>;

    /// Stage every change in the working tree.
    fn add_all(&self, path: &Path) -> Result<Output, GitError>;

    /// Get repository status in porcelain format.
    fn status_porcelain(&self, path: &Path) -> Result<Output, GitError>;

    /// Create a commit with the given message.
    fn commit(&self, path: &Path, message: &str) -> Result<Output, GitError>;

    /// Push a branch to a remote repository.
    fn push(&self, path: &Path, remote: &str, branch: &str) -> Result<Output, GitError>;
}

/// Real implementation of GitOps using std::process::Command.
#[derive(Clone, Copy)]
pub struct RealGit;

impl RealGit {
    pub fn new() -> Self {
        Self
    }

    /// Helper to run a git command and return the output.
    fn run_git(&self, cwd: &Path, args: &[&str]) -> Result<Output, GitError> {
        Command::new("git")
            .args(args)
            .current_dir(cwd)
            // Fail instead of waiting for a password on stdin.
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    GitError::GitNotFound
                } else {
                    GitError::CommandFailed(e.to_string())
                }
            })
    }

    /// Check if the output indicates success, otherwise return an error.
    fn check_output(&self, output: Output) -> Result<Output, GitError> {
        if output.status.success() {
            Ok(output)
        } else {
            let code = output.status.code().unwrap_or(-1);
            let stdout = String::from_utf8_lossy(&output.stdout).to_string();
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            let combined = if !stdout.is_empty() && !stderr.is_empty() {
                format!("{}\n{}", stdout, stderr)
            } else if !stdout.is_empty() {
                stdout
            } else {
                stderr
            };
            Err(GitError::NonZeroExit {
                code,
                output: combined,
            })
        }
    }

    fn clone_into(&self, args: &[&str], dest: &Path) -> Result<Output, GitError> {
        let cwd = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let dest = dest.to_string_lossy();
        let mut full = vec!["clone"];
        full.extend_from_slice(args);
        full.push(&dest);
        let output = self.run_git(cwd, &full)?;
        self.check_output(output)
    }
}

impl Default for RealGit {
    fn default() -> Self {
        Self::new()
    }
}

impl GitOps for RealGit {
    fn clone_branch(&self, url: &str, branch: &str, dest: &Path) -> Result<Output, GitError> {
        self.clone_into(&["--branch", branch, url], dest)
    }

    fn clone_default(&self, url: &str, dest: &Path) -> Result<Output, GitError> {
        self.clone_into(&[url], dest)
    }

    fn checkout(&self, path: &Path, branch: &str) -> Result<Output, GitError> {
        let output = self.run_git(path, &["checkout", branch])?;
        self.check_output(output)
    }

    fn checkout_new_branch(&self, path: &Path, branch: &str) -> Result<Output, GitError> {
        let output = self.run_git(path, &["checkout", "-b", branch])?;
        self.check_output(output)
    }

    fn add_all(&self, path: &Path) -> Result<Output, GitError> {
        let output = self.run_git(path, &["add", "-A", "."])?;
        self.check_output(output)
    }

    fn status_porcelain(&self, path: &Path) -> Result<Output, GitError> {
        let output = self.run_git(path, &["status", "--porcelain"])?;
        self.check_output(output)
    }

    fn commit(&self, path: &Path, message: &str) -> Result<Output, GitError> {
        let output = self.run_git(path, &["commit", "-m", message])?;
        self.check_output(output)
    }

    fn push(&self, path: &Path, remote: &str, branch: &str) -> Result<Output, GitError> {
        let output = self.run_git(path, &["push", remote, branch])?;
        self.check_output(output)
    }
}
