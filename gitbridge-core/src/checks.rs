//! Contract for the primary host's check-run API.
//!
//! The daemon crate supplies the HTTP implementation; handlers only see this
//! trait, which keeps them testable against in-memory fakes.

use serde::Serialize;

use crate::error::ChecksError;
use crate::status::{CheckConclusion, CheckRunStatus};
use crate::types::{CheckRunId, CommitSha, RepoSlug};

/// Name given to check-runs when the configuration does not override it.
pub const DEFAULT_CHECK_NAME: &str = "gitbridge";

/// Body of a check-run creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateCheckRun {
    pub name: String,
    pub head_sha: CommitSha,
    pub status: CheckRunStatus,
}

impl CreateCheckRun {
    /// A run that starts out `in_progress`.
    pub fn in_progress(name: impl Into<String>, head_sha: CommitSha) -> Self {
        Self {
            name: name.into(),
            head_sha,
            status: CheckRunStatus::InProgress,
        }
    }
}

/// Body of a check-run update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateCheckRun {
    pub name: String,
    pub status: CheckRunStatus,
    pub conclusion: CheckConclusion,
}

impl UpdateCheckRun {
    /// Mark the run `completed` with `conclusion`.
    pub fn completed(name: impl Into<String>, conclusion: CheckConclusion) -> Self {
        Self {
            name: name.into(),
            status: CheckRunStatus::Completed,
            conclusion,
        }
    }
}

/// Check-run operations the bridge needs from the primary host.
///
/// Implementations perform exactly one attempt per call; retry policy (none)
/// belongs to the caller.
pub trait ChecksApi: Send + Sync {
    fn create_check_run(
        &self,
        repo: &RepoSlug,
        request: &CreateCheckRun,
    ) -> Result<CheckRunId, ChecksError>;

    fn update_check_run(
        &self,
        repo: &RepoSlug,
        check_run: CheckRunId,
        request: &UpdateCheckRun,
    ) -> Result<(), ChecksError>;
}
