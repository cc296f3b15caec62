//! The on-disk working tree and its [`GitTransport`] implementation.
//!
//! ## `open_or_clone`
//!
//! 1. Clone the primary URL when nothing lives at the local path yet.
//! 2. Otherwise open the existing repository (a non-repository directory
//!    with content is refused).
//! 3. Point `origin` at the primary URL and the mirror remote at the
//!    secondary URL, repointing either if the configuration moved.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};
use crate::git_cli::GitCli;
use crate::pipeline::PRIMARY_REMOTE;
use crate::transport::{ensure_remote, GitTransport, PullOutcome};

/// A local clone of the primary repository, driven through the git CLI.
#[derive(Debug)]
pub struct RepoHandle {
    git: GitCli,
    path: PathBuf,
}

impl RepoHandle {
    /// Open an existing working tree.
    pub fn open(git: GitCli, path: impl Into<PathBuf>) -> Result<Self, SyncError> {
        let path = path.into();
        git.run(&path, &["rev-parse", "--git-dir"])
            .map_err(|error| SyncError::InvalidRepository {
                path: path.clone(),
                reason: error.to_string(),
            })?;
        Ok(Self { git, path })
    }

    /// Clone `url` into `path`; the parent directory is created if needed.
    pub fn clone_from(git: GitCli, url: &str, path: impl Into<PathBuf>) -> Result<Self, SyncError> {
        let path = path.into();
        let (parent, name) = match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) => (parent, name),
            _ => {
                return Err(SyncError::InvalidRepository {
                    path: path.clone(),
                    reason: "path has no final component".to_string(),
                })
            }
        };
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;

        tracing::info!("cloning {url} into {}", path.display());
        let args: [&OsStr; 5] = [
            OsStr::new("clone"),
            OsStr::new("--origin"),
            OsStr::new(PRIMARY_REMOTE),
            OsStr::new(url),
            name,
        ];
        git.run(parent, &args)?;
        Ok(Self { git, path })
    }

    /// Prepare the working tree for mirroring. See the module docs.
    pub fn open_or_clone(
        path: &Path,
        primary_url: &str,
        mirror_remote: &str,
        mirror_url: &str,
    ) -> Result<Self, SyncError> {
        let git = GitCli::from_env()?;
        let mut repo = if path.join(".git").exists() {
            tracing::info!("opening existing repository at {}", path.display());
            Self::open(git, path)?
        } else if is_non_empty_dir(path)? {
            return Err(SyncError::InvalidRepository {
                path: path.to_path_buf(),
                reason: "directory is not empty and is not a git repository".to_string(),
            });
        } else {
            Self::clone_from(git, primary_url, path)?
        };

        ensure_remote(&mut repo, PRIMARY_REMOTE, primary_url)?;
        ensure_remote(&mut repo, mirror_remote, mirror_url)?;
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn git(&self, args: &[&str]) -> Result<String, SyncError> {
        self.git.run(&self.path, args)
    }

    /// Commit HEAD resolves to, `None` on an unborn branch.
    fn head(&self) -> Result<Option<String>, SyncError> {
        let output = self
            .git
            .run_raw(&self.path, &["rev-parse", "--verify", "--quiet", "HEAD"])?;
        let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((output.status.success() && !sha.is_empty()).then_some(sha))
    }

    fn has_upstream(&self) -> Result<bool, SyncError> {
        let output = self.git.run_raw(
            &self.path,
            &["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{upstream}"],
        )?;
        Ok(output.status.success())
    }

    /// Remote-tracking refs of `remote` plus HEAD, used to tell whether a
    /// pull changed anything.
    fn snapshot(&self, remote: &str) -> Result<(String, Option<String>), SyncError> {
        let refs = self.git(&[
            "for-each-ref",
            "--format=%(objectname) %(refname)",
            &format!("refs/remotes/{remote}"),
        ])?;
        Ok((refs, self.head()?))
    }
}

impl GitTransport for RepoHandle {
    fn pull(&mut self, remote: &str) -> Result<PullOutcome, SyncError> {
        let before = self.snapshot(remote)?;
        self.git(&["fetch", "--prune", remote])?;
        // The clone never carries commits of its own, so its checked-out
        // branch simply follows upstream, rewritten history included.
        if self.has_upstream()? {
            self.git(&["reset", "--hard", "--quiet", "@{upstream}"])?;
        }
        let after = self.snapshot(remote)?;
        if before == after {
            tracing::debug!("{remote}: already up to date");
            Ok(PullOutcome::AlreadyUpToDate)
        } else {
            tracing::info!("{remote}: pulled new changes");
            Ok(PullOutcome::Updated)
        }
    }

    fn push(&mut self, remote: &str, refspecs: &[String]) -> Result<(), SyncError> {
        let mut args = vec!["push", remote];
        args.extend(refspecs.iter().map(String::as_str));
        self.git(&args)?;
        tracing::info!("pushed {} to {remote}", refspecs.join(" "));
        Ok(())
    }

    fn remote_url(&mut self, name: &str) -> Result<Option<String>, SyncError> {
        let remotes = self.git(&["remote"])?;
        if !remotes.lines().any(|line| line.trim() == name) {
            return Ok(None);
        }
        self.git(&["remote", "get-url", name]).map(Some)
    }

    fn add_remote(&mut self, name: &str, urls: &[String]) -> Result<(), SyncError> {
        let Some((first, _)) = urls.split_first() else {
            return Err(SyncError::InvalidRepository {
                path: self.path.clone(),
                reason: format!("remote '{name}' needs at least one URL"),
            });
        };
        self.git(&["remote", "add", name, first.as_str()])?;
        // With several URLs every one of them becomes an explicit push target.
        if urls.len() > 1 {
            for url in urls {
                self.git(&["remote", "set-url", "--add", "--push", name, url.as_str()])?;
            }
        }
        Ok(())
    }

    fn set_remote_url(&mut self, name: &str, url: &str) -> Result<(), SyncError> {
        self.git(&["remote", "set-url", name, url])?;
        Ok(())
    }

    fn drop_remote_head(&mut self, remote: &str) -> Result<(), SyncError> {
        let head_ref = format!("refs/remotes/{remote}/HEAD");
        let present = self.git(&["for-each-ref", "--format=%(refname)", &head_ref])?;
        if !present.is_empty() {
            self.git(&["update-ref", "--no-deref", "-d", &head_ref])?;
        }
        Ok(())
    }
}

fn is_non_empty_dir(path: &Path) -> Result<bool, SyncError> {
    if !path.exists() {
        return Ok(false);
    }
    let mut entries = std::fs::read_dir(path).map_err(|e| io_err(path, e))?;
    Ok(entries.next().is_some())
}
