//! Thin runner around the `git` executable.
//!
//! Every invocation runs non-interactively (`GIT_TERMINAL_PROMPT=0`) so a
//! remote that wants credentials fails fast instead of hanging the worker.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::SyncError;

/// Overrides the git executable (absolute path or name on `PATH`).
pub const ENV_GIT_BIN: &str = "GITBRIDGE_GIT_BIN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCli {
    binary: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("git"),
        }
    }
}

impl GitCli {
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// `git` from `PATH`, unless [`ENV_GIT_BIN`] names another binary.
    pub fn from_env() -> Result<Self, SyncError> {
        match std::env::var_os(ENV_GIT_BIN) {
            None => Ok(Self::default()),
            Some(value) if value.is_empty() => Err(SyncError::GitUnavailable {
                binary: String::new(),
                message: format!("{ENV_GIT_BIN} is set but empty; unset it or name a git binary"),
            }),
            Some(value) => Ok(Self::with_binary(value)),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Run `git <args>` in `cwd` and return trimmed stdout.
    pub fn run<S: AsRef<OsStr>>(&self, cwd: &Path, args: &[S]) -> Result<String, SyncError> {
        let output = self.run_raw(cwd, args)?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
        }
        Err(self.command_failed(args, &output))
    }

    /// Run `git <args>` without judging the exit status.
    pub fn run_raw<S: AsRef<OsStr>>(&self, cwd: &Path, args: &[S]) -> Result<Output, SyncError> {
        tracing::debug!("{} {}", self.binary.display(), render_args(args));
        Command::new(&self.binary)
            .args(args)
            .current_dir(cwd)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|error| self.spawn_failed(&error))
    }

    fn spawn_failed(&self, error: &io::Error) -> SyncError {
        let message = match error.kind() {
            io::ErrorKind::NotFound => {
                format!("not found; install git or set {ENV_GIT_BIN} to a valid binary path")
            }
            _ => error.to_string(),
        };
        SyncError::GitUnavailable {
            binary: self.binary.display().to_string(),
            message,
        }
    }

    fn command_failed<S: AsRef<OsStr>>(&self, args: &[S], output: &Output) -> SyncError {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        let detail = if !stderr.is_empty() {
            stderr
        } else if !stdout.is_empty() {
            stdout
        } else {
            format!("exit status {}", output.status)
        };
        SyncError::GitFailed {
            command: format!("{} {}", self.binary.display(), render_args(args)),
            detail,
        }
    }
}

fn render_args<S: AsRef<OsStr>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| arg.as_ref().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
