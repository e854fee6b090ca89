//! Sessions command - lists recorded sessions, or the frames of one session.

use anyhow::{bail, Result};
use colored::Colorize;

use crate::config::Config;
use crate::daemon::client;
use crate::daemon::protocol::{Request, Response};

pub fn execute(config: &Config, session_id: Option<String>) -> Result<()> {
    match session_id {
        Some(id) => show_session(config, id),
        None => list_sessions(config),
    }
}

fn list_sessions(config: &Config) -> Result<()> {
    let response = client::expect_ok(&config.socket_path, &Request::ListSessions)?;

    let Response::Sessions { sessions } = response else {
        bail!("Unexpected response from daemon");
    };

    if sessions.is_empty() {
        println!("{} No recorded sessions", "─".dimmed());
        return Ok(());
    }

    println!("Recorded sessions:");
    for id in sessions {
        println!("  {id}");
    }

    Ok(())
}

fn show_session(config: &Config, id: String) -> Result<()> {
    let response = client::expect_ok(&config.socket_path, &Request::GetSession { id: id.clone() })?;

    let Response::Frames { frames } = response else {
        bail!("Unexpected response from daemon");
    };

    println!("Session {} ({} frames)", id.bold(), frames.len());
    for frame in frames {
        println!(
            "  {}  diskstats {}B  log {}B  stdout {}B",
            frame.id,
            frame.diskstats.len(),
            frame.log.len(),
            frame.stdout.len()
        );
    }

    Ok(())
}
