//! In-memory collaborators shared by the daemon integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use gitbridge_core::{
    BridgeConfig, CheckRunId, ChecksApi, ChecksError, CreateCheckRun, RepoSlug, Settings,
    UpdateCheckRun,
};
use gitbridge_daemon::Bridge;
use gitbridge_sync::{GitTransport, MirrorSynchronizer, PullOutcome, SyncError};

pub const SECRET: &str = "s3cr3t";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksCall {
    Create(RepoSlug, CreateCheckRun),
    Update(RepoSlug, CheckRunId, UpdateCheckRun),
}

/// Records every call; hands out ids starting at 42.
#[derive(Default)]
pub struct FakeChecks {
    pub calls: Mutex<Vec<ChecksCall>>,
    next_id: AtomicU64,
    pub fail_create: bool,
    pub fail_update: bool,
}

impl FakeChecks {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(42),
            ..Self::default()
        }
    }

    pub fn failing_create() -> Self {
        Self {
            fail_create: true,
            ..Self::new()
        }
    }

    pub fn failing_update() -> Self {
        Self {
            fail_update: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<ChecksCall> {
        self.calls.lock().unwrap().clone()
    }
}

fn unavailable(endpoint: &str) -> ChecksError {
    ChecksError::Http {
        status: 502,
        endpoint: endpoint.to_string(),
        message: "bad gateway".to_string(),
    }
}

impl ChecksApi for FakeChecks {
    fn create_check_run(
        &self,
        repo: &RepoSlug,
        request: &CreateCheckRun,
    ) -> Result<CheckRunId, ChecksError> {
        self.calls
            .lock()
            .unwrap()
            .push(ChecksCall::Create(repo.clone(), request.clone()));
        if self.fail_create {
            return Err(unavailable("create"));
        }
        Ok(CheckRunId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    fn update_check_run(
        &self,
        repo: &RepoSlug,
        check_run: CheckRunId,
        request: &UpdateCheckRun,
    ) -> Result<(), ChecksError> {
        self.calls
            .lock()
            .unwrap()
            .push(ChecksCall::Update(repo.clone(), check_run, request.clone()));
        if self.fail_update {
            return Err(unavailable("update"));
        }
        Ok(())
    }
}

/// Git transport that logs pulls and pushes; pushes fail when `fail_push`.
#[derive(Clone, Default)]
pub struct FakeTransport {
    pub log: Arc<Mutex<Vec<String>>>,
    pub fail_push: bool,
}

impl FakeTransport {
    pub fn failing_push() -> Self {
        Self {
            fail_push: true,
            ..Self::default()
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl GitTransport for FakeTransport {
    fn pull(&mut self, remote: &str) -> Result<PullOutcome, SyncError> {
        self.log.lock().unwrap().push(format!("pull {remote}"));
        Ok(PullOutcome::Updated)
    }

    fn push(&mut self, remote: &str, refspecs: &[String]) -> Result<(), SyncError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("push {remote} {}", refspecs.join(" ")));
        if self.fail_push {
            return Err(SyncError::GitFailed {
                command: format!("git push {remote}"),
                detail: "remote rejected".to_string(),
            });
        }
        Ok(())
    }

    fn remote_url(&mut self, _name: &str) -> Result<Option<String>, SyncError> {
        Ok(None)
    }

    fn add_remote(&mut self, _name: &str, _urls: &[String]) -> Result<(), SyncError> {
        Ok(())
    }

    fn set_remote_url(&mut self, _name: &str, _url: &str) -> Result<(), SyncError> {
        Ok(())
    }

    fn drop_remote_head(&mut self, remote: &str) -> Result<(), SyncError> {
        self.log.lock().unwrap().push(format!("drop-head {remote}"));
        Ok(())
    }
}

pub fn config() -> BridgeConfig {
    BridgeConfig::resolve(Settings {
        secret: Some(SECRET.to_string()),
        github: Some("git@github.com:acme/widgets.git".to_string()),
        gitlab: Some("git@gitlab.example.com:mirrors/widgets.git".to_string()),
        mirror_remote: Some("gitlab".to_string()),
        ..Settings::default()
    })
    .expect("test config resolves")
}

pub fn repo() -> RepoSlug {
    RepoSlug::new("acme", "widgets")
}

/// A bridge over fakes; `checks = None` runs mirror-only.
pub fn bridge(
    checks: Option<Arc<FakeChecks>>,
    transport: &FakeTransport,
) -> Bridge {
    let synchronizer = MirrorSynchronizer::new(transport.clone(), "gitlab");
    let checks = checks.map(|c| c as Arc<dyn ChecksApi>);
    Bridge::new(&config(), synchronizer, checks)
}
