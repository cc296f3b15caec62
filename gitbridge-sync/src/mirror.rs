//! Mirror synchronizer.
//!
//! `sync` = pull the primary remote, then force-push the scope's refspec to
//! the mirror remote. The whole sequence runs under one lock owned by the
//! synchronizer, so syncs for unrelated branches serialize.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::error::SyncError;
use crate::pipeline::{SyncScope, PRIMARY_REMOTE};
use crate::transport::{GitTransport, PullOutcome};

/// Summary of one completed sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub scope: SyncScope,
    pub refspec: String,
    pub pull: PullOutcome,
    pub duration: Duration,
}

pub struct MirrorSynchronizer {
    repo: Mutex<Box<dyn GitTransport>>,
    mirror_remote: String,
}

impl MirrorSynchronizer {
    pub fn new(repo: impl GitTransport + 'static, mirror_remote: impl Into<String>) -> Self {
        Self {
            repo: Mutex::new(Box::new(repo)),
            mirror_remote: mirror_remote.into(),
        }
    }

    pub fn mirror_remote(&self) -> &str {
        &self.mirror_remote
    }

    /// Bring the mirror's copy of `scope` in line with the primary.
    ///
    /// A pull that finds nothing new still pushes; any pull or push failure
    /// is returned and nothing is retried.
    pub fn sync(&self, scope: &SyncScope) -> Result<SyncReport, SyncError> {
        let refspec = scope.refspec()?;
        let started = Instant::now();

        let pull = {
            let mut repo = self.lock_repo();
            let pull = repo.pull(PRIMARY_REMOTE)?;
            if *scope == SyncScope::AllBranches {
                repo.drop_remote_head(PRIMARY_REMOTE)?;
            }
            repo.push(&self.mirror_remote, std::slice::from_ref(&refspec))?;
            pull
        };

        let report = SyncReport {
            scope: scope.clone(),
            refspec,
            pull,
            duration: started.elapsed(),
        };
        tracing::info!(
            "mirrored {} to '{}' (pull: {}, {}ms)",
            report.scope,
            self.mirror_remote,
            report.pull.as_str(),
            report.duration.as_millis()
        );
        Ok(report)
    }

    /// Sync the branch named by an inbound full ref.
    pub fn sync_ref(&self, git_ref: &str) -> Result<SyncReport, SyncError> {
        self.sync(&SyncScope::from_ref(git_ref)?)
    }

    // A panic mid-sync leaves at worst a half-updated working tree, which the
    // next pull overwrites; the transport itself stays usable.
    fn lock_repo(&self) -> MutexGuard<'_, Box<dyn GitTransport>> {
        self.repo.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
