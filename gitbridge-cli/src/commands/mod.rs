//! Subcommands and the configuration flags they share.

pub mod serve;
pub mod status;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use gitbridge_core::{config, BridgeConfig, Settings};

/// Configuration flags; each overrides the same key in `--config`.
#[derive(Args, Debug, Default)]
pub struct BridgeArgs {
    /// YAML file with any of the settings below (flag names as keys).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Port to listen on.
    #[arg(long)]
    pub port: Option<u16>,

    /// Shared webhook secret for both hosts.
    #[arg(long, env = "GITBRIDGE_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Primary (GitHub) repository URL.
    #[arg(long, value_name = "URL")]
    pub github: Option<String>,

    /// Secondary (GitLab) repository URL.
    #[arg(long, value_name = "URL")]
    pub gitlab: Option<String>,

    /// Where the local working tree lives.
    #[arg(long, value_name = "PATH")]
    pub local_path: Option<PathBuf>,

    /// GitHub App private key (PEM).
    #[arg(long, value_name = "FILE")]
    pub privkey: Option<PathBuf>,

    #[arg(long)]
    pub app_id: Option<u64>,

    #[arg(long)]
    pub installation_id: Option<u64>,

    /// Repository owner (default: derived from --github).
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name (default: derived from --github).
    #[arg(long)]
    pub repository: Option<String>,

    /// Name shown on created check-runs.
    #[arg(long)]
    pub check_name: Option<String>,

    /// Local name of the GitLab remote.
    #[arg(long)]
    pub mirror_remote: Option<String>,

    /// Mirror every branch on each push.
    #[arg(long)]
    pub mirror_all_branches: bool,

    /// GitHub REST API base URL.
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,
}

impl BridgeArgs {
    /// Merge defaults, the config file and these flags.
    pub fn load(&self) -> Result<BridgeConfig> {
        config::load(self.config.as_deref(), self.overrides()).context("invalid configuration")
    }

    fn overrides(&self) -> Settings {
        Settings {
            port: self.port,
            secret: self.secret.clone(),
            github: self.github.clone(),
            gitlab: self.gitlab.clone(),
            local_path: self.local_path.clone(),
            privkey: self.privkey.clone(),
            app_id: self.app_id,
            installation_id: self.installation_id,
            owner: self.owner.clone(),
            repository: self.repository.clone(),
            check_name: self.check_name.clone(),
            mirror_remote: self.mirror_remote.clone(),
            mirror_all_branches: self.mirror_all_branches.then_some(true),
            api_url: self.api_url.clone(),
        }
    }
}
