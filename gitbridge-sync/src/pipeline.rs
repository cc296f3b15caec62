//! Sync scopes and the refspecs they push.

use std::fmt;

use crate::error::SyncError;

/// Remote the working tree was cloned from.
pub const PRIMARY_REMOTE: &str = "origin";

/// Forwards every primary branch onto the same-named mirror branch.
pub const ALL_BRANCHES_REFSPEC: &str = "+refs/remotes/origin/*:refs/heads/*";

const BRANCH_PREFIX: &str = "refs/heads/";

/// Scope for one mirror sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncScope {
    /// A single branch, held as its full ref (`refs/heads/<name>`).
    Branch(String),
    /// Every branch the primary remote has.
    AllBranches,
}

impl SyncScope {
    /// Scope for an inbound ref; anything outside `refs/heads/` is rejected.
    pub fn from_ref(git_ref: &str) -> Result<Self, SyncError> {
        match git_ref.strip_prefix(BRANCH_PREFIX) {
            Some(name) if !name.is_empty() => Ok(Self::Branch(git_ref.to_string())),
            _ => Err(SyncError::UnsupportedRef(git_ref.to_string())),
        }
    }

    /// Scope for a branch name as typed on the command line. Anything that
    /// already looks like a full ref must be a branch ref.
    pub fn branch(name: &str) -> Result<Self, SyncError> {
        if name.starts_with("refs/") {
            Self::from_ref(name)
        } else {
            Self::from_ref(&format!("{BRANCH_PREFIX}{name}"))
        }
    }

    /// The forced refspec pushed to the mirror.
    ///
    /// `refs/heads/main` becomes `+refs/remotes/origin/main:refs/heads/main`.
    pub fn refspec(&self) -> Result<String, SyncError> {
        match self {
            Self::AllBranches => Ok(ALL_BRANCHES_REFSPEC.to_string()),
            Self::Branch(git_ref) => {
                let name = git_ref
                    .strip_prefix(BRANCH_PREFIX)
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| SyncError::UnsupportedRef(git_ref.clone()))?;
                Ok(format!("+refs/remotes/{PRIMARY_REMOTE}/{name}:{git_ref}"))
            }
        }
    }
}

impl fmt::Display for SyncScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch(git_ref) => f.write_str(git_ref),
            Self::AllBranches => f.write_str("all branches"),
        }
    }
}
