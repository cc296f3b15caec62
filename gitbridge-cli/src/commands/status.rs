//! `gitbridge status`: print a running bridge's status as JSON.

use anyhow::{Context, Result};
use clap::Args;

use gitbridge_daemon::{request_status, DaemonError};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Address the bridge listens on.
    #[arg(long, default_value = "127.0.0.1:3000", value_name = "HOST:PORT")]
    pub addr: String,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let payload = match request_status(&self.addr) {
            Ok(status) => serde_json::to_value(status).context("failed to encode status")?,
            Err(DaemonError::NotRunning { addr }) => serde_json::json!({
                "running": false,
                "addr": addr,
            }),
            Err(err) => return Err(err).context("failed to query bridge status"),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("failed to render status JSON")?
        );
        Ok(())
    }
}
