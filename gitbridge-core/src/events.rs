//! Typed inbound events.
//!
//! The webhook layer decodes raw payloads into these variants; handlers match
//! on them exhaustively. Anything the bridge does not act on is carried as an
//! `Unsupported` variant so that dispatch stays total.

use std::fmt;

use crate::status::PipelineStatus;
use crate::types::CommitSha;

/// `action` field of a check-suite event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckSuiteAction {
    Requested,
    Rerequested,
    Completed,
    Other(String),
}

impl From<&str> for CheckSuiteAction {
    fn from(raw: &str) -> Self {
        match raw {
            "requested" => Self::Requested,
            "rerequested" => Self::Rerequested,
            "completed" => Self::Completed,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for CheckSuiteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => f.write_str("requested"),
            Self::Rerequested => f.write_str("rerequested"),
            Self::Completed => f.write_str("completed"),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

/// Events from the primary host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryEvent {
    CheckSuite {
        action: CheckSuiteAction,
        head_sha: CommitSha,
    },
    Push {
        /// Full ref name, e.g. `refs/heads/main`.
        git_ref: String,
    },
    Unsupported {
        kind: String,
    },
}

impl PrimaryEvent {
    pub fn kind(&self) -> &str {
        match self {
            Self::CheckSuite { .. } => "check_suite",
            Self::Push { .. } => "push",
            Self::Unsupported { kind } => kind,
        }
    }
}

/// Events from the secondary host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecondaryEvent {
    Pipeline {
        sha: CommitSha,
        status: PipelineStatus,
    },
    Unsupported {
        kind: String,
    },
}

impl SecondaryEvent {
    pub fn kind(&self) -> &str {
        match self {
            Self::Pipeline { .. } => "pipeline",
            Self::Unsupported { kind } => kind,
        }
    }
}
