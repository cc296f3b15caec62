//! Check-run correlation table.
//!
//! Links a commit to the check-run created for it so that a pipeline result
//! arriving later from the secondary host can be routed to the right
//! check-run. One mutex guards the whole map. Every operation copies its
//! result out before returning, so the lock is never held across I/O.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::types::{CheckRunId, CommitSha};

/// Concurrency-safe `commit -> check-run` map. Last writer wins.
#[derive(Debug, Default)]
pub struct CorrelationTable {
    entries: Mutex<HashMap<CommitSha, CheckRunId>>,
}

impl CorrelationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `sha`.
    ///
    /// Returns the handle that was replaced, if there was one.
    pub fn record(&self, sha: CommitSha, check_run: CheckRunId) -> Option<CheckRunId> {
        self.entries().insert(sha, check_run)
    }

    /// Current handle for `sha`, or `None` when no check-run was recorded.
    ///
    /// Entries are not consumed: a pipeline may report more than one terminal
    /// state for the same commit (retries), and each should reach the check-run.
    pub fn lookup(&self, sha: &CommitSha) -> Option<CheckRunId> {
        self.entries().get(sha).copied()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    // A panic while holding the lock cannot leave the map half-updated
    // (single insert/get), so a poisoned guard is still consistent.
    fn entries(&self) -> MutexGuard<'_, HashMap<CommitSha, CheckRunId>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
