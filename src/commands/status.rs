//! Status command - shows recording state and the disk alias mapping.

use anyhow::{bail, Result};
use colored::Colorize;

use crate::config::Config;
use crate::daemon::client;
use crate::daemon::protocol::{Request, Response};

pub fn execute(config: &Config) -> Result<()> {
    let response = client::expect_ok(&config.socket_path, &Request::Status)?;

    let Response::Status {
        recording,
        disk_mapping,
    } = response
    else {
        bail!("Unexpected response from daemon");
    };

    if recording {
        println!("{} Recording", "●".red().bold());
    } else {
        println!("{} Not recording", "○".dimmed());
    }

    if disk_mapping.is_empty() {
        println!("{} No disk aliases recorded yet", "─".dimmed());
    } else {
        println!("Disk aliases:");
        for (device_path, device_name) in &disk_mapping {
            println!("  {device_path} {} {device_name}", "→".cyan());
        }
    }

    Ok(())
}
