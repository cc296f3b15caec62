//! gitbridge daemon: webhook intake, event handlers, GitHub checks client
//! and the HTTP runtime.

pub mod bridge;
mod error;
pub mod github;
pub mod handlers;
pub mod protocol;
mod runtime;
pub mod webhook;

pub use bridge::Bridge;
pub use error::DaemonError;
pub use github::GitHubChecksClient;
pub use handlers::{IgnoreReason, Outcome, PrimaryHandler, SecondaryHandler};
pub use protocol::{request_status, LastSync, StatusSnapshot};
pub use runtime::{init_tracing, router, run, serve, start_blocking, AppState};
