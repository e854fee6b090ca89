//! Disk alias resolution
//!
//! hd-idle reports disks by their symlinked path (e.g.
//! `/dev/disk/by-label/backup`), while `/proc/diskstats` reports the backing
//! device name (e.g. `sda`). The resolver follows the symlink once per
//! distinct path and records the pair in the shared mapping table.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::store::mapping;

/// Resolves symlinked device paths to backing device names and persists
/// the mapping, deduplicated.
pub struct DiskAliasResolver {
    mapping_path: PathBuf,
}

impl DiskAliasResolver {
    pub fn new<P: Into<PathBuf>>(mapping_path: P) -> Self {
        Self {
            mapping_path: mapping_path.into(),
        }
    }

    /// Resolve a device path and persist the mapping if it is new.
    ///
    /// Tokens that are not absolute paths are ignored: hd-idle also logs
    /// bare device names, which need no resolution. Already mapped paths
    /// (substring containment against existing lines - a deliberately loose
    /// dedup inherited from the original table format) are skipped without
    /// touching the file.
    pub fn resolve(&self, device_path: &str) -> Result<()> {
        if !device_path.starts_with('/') {
            return Ok(());
        }

        if mapping::contains_path(&self.mapping_path, device_path)? {
            return Ok(());
        }

        let target = fs::read_link(device_path)
            .with_context(|| format!("Failed to resolve device symlink: {device_path}"))?;
        let device_name = match target.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => bail!("Device symlink has no file name: {}", target.display()),
        };

        debug!(device_path, %device_name, "recording disk alias");
        mapping::append_entry(&self.mapping_path, device_path, &device_name)
    }
}

/// Extract the `disk` field from an hd-idle log line.
///
/// Lines are comma-separated `key: value` records, e.g.
/// `date: 2024-01-01, time: 12:00:00, disk: /dev/disk/by-label/a, running: 1`.
pub fn disk_token(line: &str) -> Option<String> {
    for entry in line.split(',') {
        if let Some((key, value)) = entry.split_once(':') {
            if key.trim() == "disk" {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}
