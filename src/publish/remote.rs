//! Credential-bearing remote URLs.

use std::fmt;
use url::Url;

use super::error::{PublishError, PublishResult};
use super::git::GitError;
use crate::config::Secret;

/// An https remote with `username:token@` embedded in it.
///
/// The URL is only handed to git. `Debug` and [`AuthenticatedRemote::redact`]
/// mask the token so it cannot leak into logs or error messages.
#[derive(Clone)]
pub struct AuthenticatedRemote {
    url: String,
    token: Secret,
}

impl AuthenticatedRemote {
    /// Embed credentials into an https repository URL.
    ///
    /// Any other scheme (ssh, git, http, scp-like `git@host:path`) is
    /// rejected before anything touches the network.
    pub fn new(repo_url: &str, username: &str, token: &Secret) -> PublishResult<Self> {
        if !repo_url.starts_with("https://") {
            return Err(PublishError::UnsupportedRemote {
                url: repo_url.to_string(),
            });
        }

        let invalid = |reason: String| PublishError::InvalidRemote {
            url: repo_url.to_string(),
            reason,
        };

        let mut url = Url::parse(repo_url).map_err(|e| invalid(e.to_string()))?;
        url.set_username(username)
            .map_err(|_| invalid("cannot carry credentials".to_string()))?;
        url.set_password(Some(token.expose()))
            .map_err(|_| invalid("cannot carry credentials".to_string()))?;

        Ok(Self {
            url: url.to_string(),
            token: token.clone(),
        })
    }

    /// The URL including credentials.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Replace every occurrence of the token in `text`.
    pub fn redact(&self, text: &str) -> String {
        let raw = self.token.expose();
        if raw.is_empty() {
            return text.to_string();
        }
        let mut redacted = text.replace(raw, "***");
        if let Some(encoded) = self.encoded_token() {
            if encoded != raw {
                redacted = redacted.replace(&encoded, "***");
            }
        }
        redacted
    }

    /// Strip the token from a git failure before it is surfaced.
    pub fn redact_error(&self, err: GitError) -> GitError {
        match err {
            GitError::NonZeroExit { code, output } => GitError::NonZeroExit {
                code,
                output: self.redact(&output),
            },
            GitError::CommandFailed(msg) => GitError::CommandFailed(self.redact(&msg)),
            other => other,
        }
    }

    fn encoded_token(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.password().map(str::to_string))
    }
}

impl fmt::Debug for AuthenticatedRemote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedRemote")
            .field("url", &self.redact(&self.url))
            .finish()
    }
}
