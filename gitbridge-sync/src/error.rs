//! Error types for gitbridge-sync.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from repository preparation and mirror syncs.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The git binary could not be started at all.
    #[error("git binary `{binary}` is unavailable: {message}")]
    GitUnavailable { binary: String, message: String },

    /// A git command ran and exited non-zero.
    #[error("git command failed (`{command}`): {detail}")]
    GitFailed { command: String, detail: String },

    /// Only branch refs can be mirrored.
    #[error("ref '{0}' is not a branch (expected refs/heads/<name>)")]
    UnsupportedRef(String),

    /// The local path exists but cannot host the working tree.
    #[error("cannot use {path} as the local repository: {reason}")]
    InvalidRepository { path: PathBuf, reason: String },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
