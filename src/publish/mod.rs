//! Publish module - commits an extracted backup into a git repository.
//!
//! Only https remotes are supported; credentials are embedded in the clone
//! URL and never written to logs or error output.

mod archive;
mod error;
mod git;
mod publisher;
mod remote;

#[cfg(test)]
pub(crate) use archive::fixtures::write_backup_zip;
pub use archive::{extract_zip, replace_dir};
pub use error::{PublishError, PublishResult};
#[cfg(test)]
pub use git::MockGitOps;
pub use git::{GitError, GitOps, RealGit};
pub use publisher::{PublishOutcome, Publisher, commit_message, project_dir_name};
pub use remote::AuthenticatedRemote;
