//! `/status` snapshot and the client that reads it.

use std::thread::sleep;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::DaemonError;

/// JSON body of `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub running: bool,
    pub started_at_unix: u64,
    pub repository: String,
    pub mirror_remote: String,
    pub checks_enabled: bool,
    pub correlated_commits: usize,
    pub syncs_succeeded: u64,
    pub syncs_failed: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_sync: Option<LastSync>,
}

/// Most recent mirror sync attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastSync {
    pub scope: String,
    /// `updated`, `already-up-to-date`, or `failed: <reason>`.
    pub outcome: String,
    pub duration_ms: u64,
    pub finished_at_unix: u64,
}

/// Fetch the snapshot from a bridge listening on `addr` (`host:port`).
///
/// Connection failures are retried briefly so a bridge that is still binding
/// is not reported as down.
pub fn request_status(addr: &str) -> Result<StatusSnapshot, DaemonError> {
    let url = format!("http://{addr}/status");
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(5))
        .build();

    let mut last_not_running: Option<DaemonError> = None;
    for attempt in 0..5 {
        match agent.get(&url).call() {
            Ok(response) => {
                return response
                    .into_json::<StatusSnapshot>()
                    .map_err(|e| DaemonError::Protocol(format!("malformed status from {url}: {e}")))
            }
            Err(ureq::Error::Status(code, _)) => {
                return Err(DaemonError::Protocol(format!("{url} answered HTTP {code}")))
            }
            Err(ureq::Error::Transport(_)) => {
                last_not_running = Some(DaemonError::NotRunning {
                    addr: addr.to_string(),
                });
                if attempt < 4 {
                    sleep(Duration::from_millis(100));
                }
            }
        }
    }

    Err(last_not_running.unwrap_or_else(|| {
        DaemonError::Protocol("status retry loop exited unexpectedly".to_string())
    }))
}
