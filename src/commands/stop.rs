//! Stop command - gracefully shuts down a running daemon.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::Config;
use crate::daemon::client;
use crate::daemon::protocol::Request;
use crate::daemon::DaemonServer;

pub fn execute(config: &Config) -> Result<()> {
    if !DaemonServer::is_running(&config.data_dir) {
        println!("{} Daemon is not running", "─".dimmed());
        return Ok(());
    }

    println!("{} Stopping daemon...", "→".cyan().bold());
    client::expect_ok(&config.socket_path, &Request::Shutdown)
        .context("Failed to stop daemon")?;

    println!("{} Daemon stopped", "✓".green().bold());
    Ok(())
}
