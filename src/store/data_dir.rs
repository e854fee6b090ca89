use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::store::mapping::DISK_MAPPING_FILE;

/// Name of the PID file written by a running daemon.
pub const PID_FILE: &str = "hdtd.pid";

/// The on-disk data root.
///
/// Layout:
/// ```text
/// <root>/<sessionEpochSeconds>/<frameEpochSeconds>/{diskstats,log,stdout}
/// <root>/disk_mapping.txt
/// <root>/hdtd.pid        (while the daemon runs)
/// <root>/config.toml     (optional)
/// ```
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Create the data root and the disk mapping table if absent.
    ///
    /// Failure here is fatal at startup: without a writable data root the
    /// daemon has nowhere to record.
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.root).with_context(|| {
            format!("Failed to create data directory: {}", self.root.display())
        })?;

        let mapping_path = self.mapping_path();
        if !mapping_path.exists() {
            fs::write(&mapping_path, "").with_context(|| {
                format!(
                    "Failed to create disk mapping file: {}",
                    mapping_path.display()
                )
            })?;
        }

        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mapping_path(&self) -> PathBuf {
        self.root.join(DISK_MAPPING_FILE)
    }

    pub fn pid_path(&self) -> PathBuf {
        self.root.join(PID_FILE)
    }

    pub fn session_path(&self, session_id: &str) -> PathBuf {
        self.root.join(session_id)
    }
}
