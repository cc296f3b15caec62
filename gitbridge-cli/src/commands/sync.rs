//! `gitbridge sync`: one-shot mirror sync through the same synchronizer the
//! webhook path uses.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use gitbridge_daemon::init_tracing;
use gitbridge_sync::{MirrorSynchronizer, PullOutcome, RepoHandle, SyncScope};

use super::BridgeArgs;

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Branch to mirror, e.g. `main` or `refs/heads/main` (omit with `--all`).
    pub branch: Option<String>,

    /// Mirror every branch.
    #[arg(long, conflicts_with = "branch")]
    pub all: bool,

    #[command(flatten)]
    pub bridge: BridgeArgs,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        init_tracing();
        let config = self.bridge.load()?;

        let scope = match (&self.branch, self.all || config.mirror_all_branches) {
            (Some(branch), _) => SyncScope::branch(branch)?,
            (None, true) => SyncScope::AllBranches,
            (None, false) => bail!("provide a branch name or use --all"),
        };

        let repo = RepoHandle::open_or_clone(
            &config.local_path,
            &config.primary_url,
            &config.mirror_remote,
            &config.secondary_url,
        )
        .with_context(|| format!("cannot prepare {}", config.local_path.display()))?;
        let synchronizer = MirrorSynchronizer::new(repo, config.mirror_remote.clone());

        let report = synchronizer
            .sync(&scope)
            .with_context(|| format!("sync failed for {scope}"))?;

        let pulled = match report.pull {
            PullOutcome::Updated => "pulled new changes",
            PullOutcome::AlreadyUpToDate => "already up to date",
        };
        println!(
            "{} {} mirrored to '{}' ({pulled}, {}ms)",
            "✓".green(),
            report.scope,
            synchronizer.mirror_remote(),
            report.duration.as_millis()
        );
        println!("  {}", report.refspec);
        Ok(())
    }
}
