//! Primary- and secondary-host event handlers.
//!
//! Both run on blocking worker threads: every collaborator call (git, the
//! check-run API) is synchronous I/O. A handler returns what it did as an
//! [`Outcome`]; failures come back as errors for the caller to log. Nothing
//! here retries.

use std::fmt;
use std::sync::Arc;

use gitbridge_core::{
    translate, CheckConclusion, CheckRunId, CheckSuiteAction, ChecksApi, CommitSha,
    CorrelationTable, CreateCheckRun, PipelineStatus, PrimaryEvent, RepoSlug, SecondaryEvent,
    UpdateCheckRun,
};
use gitbridge_sync::{MirrorSynchronizer, SyncError, SyncReport, SyncScope};

use crate::error::DaemonError;

/// What handling one event amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    CheckRunCreated {
        sha: CommitSha,
        check_run: CheckRunId,
    },
    Mirrored(SyncReport),
    CheckRunCompleted {
        sha: CommitSha,
        check_run: CheckRunId,
        conclusion: CheckConclusion,
    },
    Ignored(IgnoreReason),
}

/// Why an event needed no action. None of these are failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    UnsupportedEvent(String),
    CheckSuiteAction(CheckSuiteAction),
    ChecksDisabled,
    PipelineNotTerminal(PipelineStatus),
    NoCorrelation(CommitSha),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedEvent(kind) => write!(f, "unsupported event '{kind}'"),
            Self::CheckSuiteAction(action) => write!(f, "check_suite action '{action}'"),
            Self::ChecksDisabled => f.write_str("check-runs are disabled"),
            Self::PipelineNotTerminal(status) => write!(f, "pipeline still {status}"),
            Self::NoCorrelation(sha) => write!(f, "no check-run recorded for {sha}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Primary host
// ---------------------------------------------------------------------------

/// Reacts to check-suite and push events from the primary host.
pub struct PrimaryHandler {
    repo: RepoSlug,
    check_name: String,
    /// `None` runs mirror-only.
    checks: Option<Arc<dyn ChecksApi>>,
    correlation: Arc<CorrelationTable>,
    synchronizer: Arc<MirrorSynchronizer>,
    mirror_all_branches: bool,
}

impl PrimaryHandler {
    pub fn new(
        repo: RepoSlug,
        check_name: impl Into<String>,
        checks: Option<Arc<dyn ChecksApi>>,
        correlation: Arc<CorrelationTable>,
        synchronizer: Arc<MirrorSynchronizer>,
    ) -> Self {
        Self {
            repo,
            check_name: check_name.into(),
            checks,
            correlation,
            synchronizer,
            mirror_all_branches: false,
        }
    }

    /// Sync every branch on each push instead of only the pushed one.
    pub fn mirror_all_branches(mut self, enabled: bool) -> Self {
        self.mirror_all_branches = enabled;
        self
    }

    pub fn handle(&self, event: PrimaryEvent) -> Result<Outcome, DaemonError> {
        match event {
            PrimaryEvent::CheckSuite {
                action: CheckSuiteAction::Requested,
                head_sha,
            } => self.open_check_run(head_sha),
            PrimaryEvent::CheckSuite { action, .. } => {
                Ok(Outcome::Ignored(IgnoreReason::CheckSuiteAction(action)))
            }
            PrimaryEvent::Push { git_ref } => {
                let scope = self.scope_for(&git_ref)?;
                Ok(Outcome::Mirrored(self.synchronizer.sync(&scope)?))
            }
            PrimaryEvent::Unsupported { kind } => {
                Ok(Outcome::Ignored(IgnoreReason::UnsupportedEvent(kind)))
            }
        }
    }

    /// What a push to `git_ref` mirrors.
    pub fn scope_for(&self, git_ref: &str) -> Result<SyncScope, SyncError> {
        if self.mirror_all_branches {
            Ok(SyncScope::AllBranches)
        } else {
            SyncScope::from_ref(git_ref)
        }
    }

    fn open_check_run(&self, sha: CommitSha) -> Result<Outcome, DaemonError> {
        let Some(checks) = &self.checks else {
            return Ok(Outcome::Ignored(IgnoreReason::ChecksDisabled));
        };
        let request = CreateCheckRun::in_progress(self.check_name.clone(), sha.clone());
        let check_run = checks.create_check_run(&self.repo, &request)?;
        if let Some(previous) = self.correlation.record(sha.clone(), check_run) {
            tracing::debug!(%sha, %previous, %check_run, "replaced earlier check-run");
        }
        Ok(Outcome::CheckRunCreated { sha, check_run })
    }
}

// ---------------------------------------------------------------------------
// Secondary host
// ---------------------------------------------------------------------------

/// Reacts to pipeline events from the secondary host.
pub struct SecondaryHandler {
    repo: RepoSlug,
    check_name: String,
    checks: Option<Arc<dyn ChecksApi>>,
    correlation: Arc<CorrelationTable>,
}

impl SecondaryHandler {
    pub fn new(
        repo: RepoSlug,
        check_name: impl Into<String>,
        checks: Option<Arc<dyn ChecksApi>>,
        correlation: Arc<CorrelationTable>,
    ) -> Self {
        Self {
            repo,
            check_name: check_name.into(),
            checks,
            correlation,
        }
    }

    /// Non-terminal → ignore; lookup (absent → ignore); translate; update.
    pub fn handle(&self, event: SecondaryEvent) -> Result<Outcome, DaemonError> {
        let (sha, status) = match event {
            SecondaryEvent::Pipeline { sha, status } => (sha, status),
            SecondaryEvent::Unsupported { kind } => {
                return Ok(Outcome::Ignored(IgnoreReason::UnsupportedEvent(kind)))
            }
        };
        if !status.is_terminal() {
            return Ok(Outcome::Ignored(IgnoreReason::PipelineNotTerminal(status)));
        }
        let Some(checks) = &self.checks else {
            return Ok(Outcome::Ignored(IgnoreReason::ChecksDisabled));
        };
        let Some(check_run) = self.correlation.lookup(&sha) else {
            return Ok(Outcome::Ignored(IgnoreReason::NoCorrelation(sha)));
        };

        let conclusion = translate(&status)?;
        let request = UpdateCheckRun::completed(self.check_name.clone(), conclusion);
        checks.update_check_run(&self.repo, check_run, &request)?;
        Ok(Outcome::CheckRunCompleted {
            sha,
            check_run,
            conclusion,
        })
    }
}
