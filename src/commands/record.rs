//! Record command - starts or stops the recording scheduler in a running
//! daemon. Both directions are idempotent.

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;
use crate::daemon::client;
use crate::daemon::protocol::{RecordAction, Request};

pub fn execute(config: &Config, action: RecordAction) -> Result<()> {
    client::expect_ok(&config.socket_path, &Request::Record { action })?;

    match action {
        RecordAction::Start => println!("{} Recording started", "●".red().bold()),
        RecordAction::Stop => println!("{} Recording stopped", "✓".green().bold()),
    }

    Ok(())
}
