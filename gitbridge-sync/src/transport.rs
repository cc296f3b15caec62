//! Repository transport contract.
//!
//! Everything the synchronizer asks of a repository: pull from a remote, push
//! refspecs to a remote, and manage remote registration. Methods take
//! `&mut self` because every one of them mutates the working tree or its
//! configuration; callers serialize access.

use crate::error::SyncError;

/// Result of a successful pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// New objects or ref movements were brought in.
    Updated,
    /// Local state already matched the remote.
    AlreadyUpToDate,
}

impl PullOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::AlreadyUpToDate => "already-up-to-date",
        }
    }
}

/// What [`ensure_remote`] had to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteRegistration {
    Added,
    Unchanged,
    UrlUpdated { previous: String },
}

pub trait GitTransport: Send {
    /// Fetch `remote` and bring the working tree up to date with it.
    ///
    /// "Nothing to do" is [`PullOutcome::AlreadyUpToDate`], never an error.
    fn pull(&mut self, remote: &str) -> Result<PullOutcome, SyncError>;

    fn push(&mut self, remote: &str, refspecs: &[String]) -> Result<(), SyncError>;

    /// Fetch URL of `name`, or `None` if no such remote is registered.
    fn remote_url(&mut self, name: &str) -> Result<Option<String>, SyncError>;

    /// Register `name`; additional URLs become extra push targets.
    fn add_remote(&mut self, name: &str, urls: &[String]) -> Result<(), SyncError>;

    fn set_remote_url(&mut self, name: &str, url: &str) -> Result<(), SyncError>;

    /// Remove the `refs/remotes/<remote>/HEAD` symbolic ref if present.
    fn drop_remote_head(&mut self, remote: &str) -> Result<(), SyncError>;
}

/// Make sure `name` points at `url`, adding or repointing it as needed.
pub fn ensure_remote(
    repo: &mut dyn GitTransport,
    name: &str,
    url: &str,
) -> Result<RemoteRegistration, SyncError> {
    match repo.remote_url(name)? {
        None => {
            repo.add_remote(name, &[url.to_string()])?;
            tracing::info!("registered remote '{name}' -> {url}");
            Ok(RemoteRegistration::Added)
        }
        Some(current) if current == url => Ok(RemoteRegistration::Unchanged),
        Some(previous) => {
            repo.set_remote_url(name, url)?;
            tracing::warn!("remote '{name}' moved from {previous} to {url}");
            Ok(RemoteRegistration::UrlUpdated { previous })
        }
    }
}
