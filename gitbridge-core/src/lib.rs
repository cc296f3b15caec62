//! gitbridge core library: domain types, status translation, check-run
//! correlation, inbound event variants and configuration.
//!
//! Public API surface:
//! - [`types`]: newtypes for commits, check-runs and repositories
//! - [`status`]: pipeline/check-run vocabularies and [`translate`]
//! - [`correlation`]: [`CorrelationTable`]
//! - [`events`]: typed inbound events
//! - [`checks`]: [`ChecksApi`], the primary host's check-run contract
//! - [`config`]: settings file + overrides → [`BridgeConfig`]
//! - [`error`]: [`CoreError`], [`ConfigError`], [`ChecksError`]

pub mod checks;
pub mod config;
pub mod correlation;
pub mod error;
pub mod events;
pub mod status;
pub mod types;

pub use checks::{ChecksApi, CreateCheckRun, UpdateCheckRun};
pub use config::{AppCredentials, BridgeConfig, Settings};
pub use correlation::CorrelationTable;
pub use error::{ChecksError, ConfigError, CoreError};
pub use events::{CheckSuiteAction, PrimaryEvent, SecondaryEvent};
pub use status::{translate, CheckConclusion, CheckRunStatus, PipelineStatus};
pub use types::{CheckRunId, CommitSha, RepoSlug};
