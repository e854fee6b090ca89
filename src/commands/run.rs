//! Run command - serves the control socket and recording scheduler in the
//! foreground. Intended to run under a process supervisor (e.g. a systemd
//! unit); logs go to stderr via `tracing`.

use anyhow::{bail, Context, Result};
use std::sync::atomic::Ordering;

use crate::config::Config;
use crate::daemon::DaemonServer;

pub fn execute(config: Config) -> Result<()> {
    if DaemonServer::is_running(&config.data_dir) {
        bail!(
            "Daemon is already running (data dir: {})",
            config.data_dir.display()
        );
    }

    let server = DaemonServer::new(config);

    let shutdown = server.shutdown_handle();
    ctrlc::set_handler(move || {
        shutdown.store(true, Ordering::Relaxed);
    })
    .context("Failed to install signal handler")?;

    server.run_foreground()
}
