//! Error types for gitbridge-core.

use std::path::PathBuf;

use thiserror::Error;

/// Domain-level failures: malformed identifiers and untranslatable statuses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A commit identifier that is not a 4–64 character hex digest.
    #[error("invalid commit identifier '{0}'")]
    InvalidCommitSha(String),

    /// `translate` was called with a status that has not finished yet.
    #[error("pipeline status '{0}' is not terminal")]
    NonTerminalStatus(String),

    /// A terminal status with no entry in the translation table.
    #[error("unsupported pipeline status '{0}'")]
    UnsupportedStatus(String),
}

/// All errors that can arise while loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure reading the config file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load; includes file path and line context from serde_yaml.
    /// Unknown keys land here too.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The config file named on the command line does not exist.
    #[error("config file not found at {path}")]
    NotFound { path: PathBuf },

    /// A required key was not supplied by any source.
    #[error("missing required setting '{key}'")]
    Missing { key: &'static str },

    /// A key was supplied but its value cannot be used.
    #[error("invalid setting '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Failures talking to the primary host's check-run API.
#[derive(Debug, Error)]
pub enum ChecksError {
    /// The API answered with a non-success status.
    #[error("HTTP {status} from {endpoint}: {message}")]
    Http {
        status: u16,
        endpoint: String,
        message: String,
    },

    /// Connection, TLS or timeout failure before a response arrived.
    #[error("transport error calling {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// Credentials could not be turned into an access token.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The response body did not have the expected shape.
    #[error("unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}
