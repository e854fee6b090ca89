//! Daemon configuration
//!
//! Configuration is read from `config.toml` inside the data directory.
//! Every field has a default, so a missing file (the common case) yields a
//! fully usable configuration pointing at the standard system paths.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the optional configuration file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Runtime configuration for the recording daemon.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding recorded sessions and the disk mapping table
    pub data_dir: PathBuf,
    /// Unix domain socket the control server listens on
    pub socket_path: PathBuf,
    /// Kernel disk I/O counter file, snapshotted verbatim each tick
    pub diskstats_path: PathBuf,
    /// hd-idle log file, tailed incrementally each tick
    pub idle_log_path: PathBuf,
    /// hd-idle stdout capture, tailed incrementally each tick
    pub idle_stdout_path: PathBuf,
    /// Seconds between capture ticks
    pub capture_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            socket_path: PathBuf::from("/tmp/hdtd.sock"),
            diskstats_path: PathBuf::from("/proc/diskstats"),
            idle_log_path: PathBuf::from("/var/log/hd-idle.log"),
            idle_stdout_path: PathBuf::from("/var/log/hd-idle.out"),
            capture_interval_secs: 5,
        }
    }
}

/// Default data directory: `<platform config dir>/hdtd`.
pub fn default_data_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hdtd")
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&default_data_dir().join(CONFIG_FILE))
    }

    /// Load configuration from a specific file, falling back to defaults
    /// when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Interval between capture ticks.
    pub fn capture_interval(&self) -> Duration {
        Duration::from_secs(self.capture_interval_secs)
    }
}
