//! `gitbridge serve`: run the bridge in the foreground.

use anyhow::{Context, Result};
use clap::Args;

use gitbridge_daemon::start_blocking;

use super::BridgeArgs;

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub bridge: BridgeArgs,
}

impl ServeArgs {
    pub fn run(self) -> Result<()> {
        let config = self.bridge.load()?;
        start_blocking(config).context("bridge exited with error")
    }
}
