use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the bridge runtime, handlers and status protocol.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] gitbridge_core::ConfigError),

    #[error("{0}")]
    Core(#[from] gitbridge_core::CoreError),

    #[error("mirror sync error: {0}")]
    Sync(#[from] gitbridge_sync::SyncError),

    #[error("check-run API error: {0}")]
    Checks(#[from] gitbridge_core::ChecksError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot load GitHub App key from {path}: {message}")]
    Credentials { path: PathBuf, message: String },

    #[error("bridge protocol error: {0}")]
    Protocol(String),

    #[error("bridge is not running (no answer at {addr})")]
    NotRunning { addr: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
