//! One configured repository pair: handlers, shared state and counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use gitbridge_core::{BridgeConfig, ChecksApi, CorrelationTable, PrimaryEvent, SecondaryEvent};
use gitbridge_sync::{MirrorSynchronizer, RepoHandle, SyncError};

use crate::error::DaemonError;
use crate::github::GitHubChecksClient;
use crate::handlers::{Outcome, PrimaryHandler, SecondaryHandler};
use crate::protocol::{LastSync, StatusSnapshot};

/// Everything a running bridge shares between requests.
pub struct Bridge {
    secret: String,
    repository: String,
    mirror_remote: String,
    checks_enabled: bool,
    started_at_unix: u64,
    correlation: Arc<CorrelationTable>,
    primary: PrimaryHandler,
    secondary: SecondaryHandler,
    stats: SyncStats,
}

#[derive(Default)]
struct SyncStats {
    succeeded: AtomicU64,
    failed: AtomicU64,
    last: Mutex<Option<LastSync>>,
}

impl Bridge {
    /// Prepare the working tree and API client for `config`.
    ///
    /// Any failure here is a startup failure.
    pub fn from_config(config: &BridgeConfig) -> Result<Self, DaemonError> {
        let repo = RepoHandle::open_or_clone(
            &config.local_path,
            &config.primary_url,
            &config.mirror_remote,
            &config.secondary_url,
        )?;
        let synchronizer = MirrorSynchronizer::new(repo, config.mirror_remote.clone());

        let checks: Option<Arc<dyn ChecksApi>> = match &config.app {
            Some(app) => Some(Arc::new(GitHubChecksClient::from_app(&config.api_url, app)?)),
            None => {
                tracing::warn!("no GitHub App credentials configured; running mirror-only");
                None
            }
        };
        Ok(Self::new(config, synchronizer, checks))
    }

    /// Assemble a bridge from already-built collaborators.
    pub fn new(
        config: &BridgeConfig,
        synchronizer: MirrorSynchronizer,
        checks: Option<Arc<dyn ChecksApi>>,
    ) -> Self {
        let checks_enabled = checks.is_some();
        let correlation = Arc::new(CorrelationTable::new());
        let synchronizer = Arc::new(synchronizer);
        let primary = PrimaryHandler::new(
            config.repo.clone(),
            config.check_name.clone(),
            checks.clone(),
            Arc::clone(&correlation),
            Arc::clone(&synchronizer),
        )
        .mirror_all_branches(config.mirror_all_branches);
        let secondary = SecondaryHandler::new(
            config.repo.clone(),
            config.check_name.clone(),
            checks,
            Arc::clone(&correlation),
        );

        Self {
            secret: config.secret.clone(),
            repository: config.repo.to_string(),
            mirror_remote: config.mirror_remote.clone(),
            checks_enabled,
            started_at_unix: unix_seconds_now(),
            correlation,
            primary,
            secondary,
            stats: SyncStats::default(),
        }
    }

    pub fn secret(&self) -> &[u8] {
        self.secret.as_bytes()
    }

    /// Run the primary handler and log what happened.
    pub fn handle_primary(&self, event: PrimaryEvent) -> Result<Outcome, DaemonError> {
        let kind = event.kind().to_string();
        let scope = match &event {
            PrimaryEvent::Push { git_ref } => self
                .primary
                .scope_for(git_ref)
                .map_or_else(|_| git_ref.clone(), |scope| scope.to_string()),
            _ => String::new(),
        };
        let started = std::time::Instant::now();
        let result = self.primary.handle(event);

        match &result {
            Ok(Outcome::Mirrored(report)) => self.stats.record(LastSync {
                scope: report.scope.to_string(),
                outcome: report.pull.as_str().to_string(),
                duration_ms: millis(report.duration),
                finished_at_unix: unix_seconds_now(),
            }),
            Err(DaemonError::Sync(err)) if !matches!(err, SyncError::UnsupportedRef(_)) => {
                self.stats.record(LastSync {
                    scope,
                    outcome: format!("failed: {err}"),
                    duration_ms: millis(started.elapsed()),
                    finished_at_unix: unix_seconds_now(),
                })
            }
            _ => {}
        }
        log_outcome(&kind, &result);
        result
    }

    /// Run the secondary handler and log what happened.
    pub fn handle_secondary(&self, event: SecondaryEvent) -> Result<Outcome, DaemonError> {
        let kind = event.kind().to_string();
        let result = self.secondary.handle(event);
        log_outcome(&kind, &result);
        result
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            running: true,
            started_at_unix: self.started_at_unix,
            repository: self.repository.clone(),
            mirror_remote: self.mirror_remote.clone(),
            checks_enabled: self.checks_enabled,
            correlated_commits: self.correlation.len(),
            syncs_succeeded: self.stats.succeeded.load(Ordering::Relaxed),
            syncs_failed: self.stats.failed.load(Ordering::Relaxed),
            last_sync: self.stats.last(),
        }
    }
}

impl SyncStats {
    fn record(&self, sync: LastSync) {
        let counter = if sync.outcome.starts_with("failed") {
            &self.failed
        } else {
            &self.succeeded
        };
        counter.fetch_add(1, Ordering::Relaxed);
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(sync);
    }

    fn last(&self) -> Option<LastSync> {
        self.last.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

fn log_outcome(kind: &str, result: &Result<Outcome, DaemonError>) {
    match result {
        Ok(Outcome::CheckRunCreated { sha, check_run }) => {
            tracing::info!(event = kind, %sha, %check_run, "check-run created and recorded");
        }
        Ok(Outcome::Mirrored(report)) => {
            tracing::info!(
                event = kind,
                scope = %report.scope,
                pull = report.pull.as_str(),
                duration_ms = millis(report.duration),
                "mirror synced"
            );
        }
        Ok(Outcome::CheckRunCompleted {
            sha,
            check_run,
            conclusion,
        }) => {
            tracing::info!(event = kind, %sha, %check_run, %conclusion, "check-run completed");
        }
        Ok(Outcome::Ignored(reason)) => {
            tracing::debug!(event = kind, %reason, "event ignored");
        }
        Err(err) => {
            tracing::error!(event = kind, error = %err, "event dropped");
        }
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn unix_seconds_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
