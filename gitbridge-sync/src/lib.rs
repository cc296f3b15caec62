//! # gitbridge-sync
//!
//! Mirror synchronization between the primary and secondary remotes of one
//! local repository.
//!
//! [`RepoHandle::open_or_clone`] prepares the working tree, and
//! [`MirrorSynchronizer::sync`] runs the pull/push critical section for a
//! [`SyncScope`]. The synchronizer only sees the [`GitTransport`] trait, so
//! tests can drive it without a git binary.

pub mod error;
pub mod git_cli;
pub mod mirror;
pub mod pipeline;
pub mod repo;
pub mod transport;

pub use error::SyncError;
pub use mirror::{MirrorSynchronizer, SyncReport};
pub use pipeline::{SyncScope, ALL_BRANCHES_REFSPEC, PRIMARY_REMOTE};
pub use repo::RepoHandle;
pub use transport::{ensure_remote, GitTransport, PullOutcome, RemoteRegistration};
