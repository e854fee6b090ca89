//! Disk alias mapping table
//!
//! A durable, append-only table of `devicePath:deviceName` lines shared by
//! every recording session. Appends take an exclusive `fs2` advisory lock so
//! concurrent writers cannot interleave partial lines. Advisory locks are
//! cooperative - all writers must go through [`append_entry`].

use anyhow::{Context, Result};
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Name of the mapping table inside the data directory.
pub const DISK_MAPPING_FILE: &str = "disk_mapping.txt";

/// Parse the mapping table into `devicePath -> deviceName`.
///
/// Each line is split at its first `:`; lines without a separator are
/// skipped.
pub fn read_mapping(path: &Path) -> Result<BTreeMap<String, String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read disk mapping file: {}", path.display()))?;

    let mut mapping = BTreeMap::new();
    for line in content.lines() {
        if let Some((device_path, device_name)) = line.split_once(':') {
            mapping.insert(device_path.to_string(), device_name.to_string());
        }
    }

    Ok(mapping)
}

/// Check whether any existing line contains `device_path` as a substring.
///
/// This is deliberately looser than a field-exact match: a path that is a
/// substring of an already mapped path is treated as already resolved.
pub fn contains_path(path: &Path, device_path: &str) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read disk mapping file: {}", path.display()))?;

    Ok(content.lines().any(|line| line.contains(device_path)))
}

/// Append a `devicePath:deviceName` line under an exclusive lock.
pub fn append_entry(path: &Path, device_path: &str, device_name: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("Failed to open disk mapping file: {}", path.display()))?;

    file.lock_exclusive()
        .with_context(|| format!("Failed to lock disk mapping file: {}", path.display()))?;
    file.write_all(format!("{device_path}:{device_name}\n").as_bytes())
        .with_context(|| format!("Failed to append to disk mapping file: {}", path.display()))?;
    file.flush()
        .with_context(|| format!("Failed to flush disk mapping file: {}", path.display()))?;

    Ok(())
}
