//! Status vocabularies of the two hosts and the translation between them.
//!
//! The secondary host reports pipeline states; the primary host accepts
//! check-run conclusions. Only terminal pipeline states translate, and only
//! through the fixed table in [`translate`]. Nothing is ever defaulted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// PipelineStatus
// ---------------------------------------------------------------------------

/// Pipeline state as reported by the secondary host.
///
/// Values the bridge has no use for are kept verbatim in [`PipelineStatus::Other`]
/// so they can be reported instead of silently mapped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PipelineStatus {
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
    Skipped,
    Other(String),
}

impl PipelineStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Skipped => "skipped",
            Self::Other(raw) => raw,
        }
    }

    /// `false` while the pipeline can still change state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Running)
    }
}

impl From<&str> for PipelineStatus {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "success" => Self::Success,
            "failed" => Self::Failed,
            "canceled" => Self::Canceled,
            "skipped" => Self::Skipped,
            _ => Self::Other(raw.to_owned()),
        }
    }
}

impl From<String> for PipelineStatus {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<PipelineStatus> for String {
    fn from(status: PipelineStatus) -> Self {
        match status {
            PipelineStatus::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Check-run vocabulary
// ---------------------------------------------------------------------------

/// Conclusion accepted by the primary host for a completed check-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckConclusion {
    Success,
    Failure,
    Cancelled,
}

impl CheckConclusion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for CheckConclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle position of a check-run on the primary host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunStatus {
    Queued,
    InProgress,
    Completed,
}

impl CheckRunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for CheckRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Translation
// ---------------------------------------------------------------------------

/// Map a terminal pipeline status onto a check-run conclusion.
///
/// | pipeline | conclusion |
/// |----------|------------|
/// | success  | success    |
/// | canceled | cancelled  |
/// | failed   | failure    |
/// | skipped  | cancelled  |
///
/// Returns [`CoreError::NonTerminalStatus`] for pending/running (callers must
/// filter those first) and [`CoreError::UnsupportedStatus`] for anything else.
pub fn translate(status: &PipelineStatus) -> Result<CheckConclusion, CoreError> {
    match status {
        PipelineStatus::Success => Ok(CheckConclusion::Success),
        PipelineStatus::Canceled | PipelineStatus::Skipped => Ok(CheckConclusion::Cancelled),
        PipelineStatus::Failed => Ok(CheckConclusion::Failure),
        PipelineStatus::Pending | PipelineStatus::Running => {
            Err(CoreError::NonTerminalStatus(status.to_string()))
        }
        PipelineStatus::Other(raw) => Err(CoreError::UnsupportedStatus(raw.clone())),
    }
}
