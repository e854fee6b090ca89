//! Frame capture pipeline
//!
//! One invocation per scheduler tick: snapshot the kernel diskstats file,
//! drain each monitored log source through its cursor, and write the results
//! into a new frame directory named by the current epoch second. The first
//! failure aborts the remaining steps; the frame stays incomplete and the
//! next tick proceeds normally.

use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

use crate::capture::alias::{disk_token, DiskAliasResolver};
use crate::capture::cursor::LogCursor;
use crate::config::Config;
use crate::store::sessions::{DISKSTATS_ARTIFACT, LOG_ARTIFACT, STDOUT_ARTIFACT};

/// One monitored log stream and its cursor.
struct LogSource {
    /// Artifact file name inside the frame directory
    artifact: &'static str,
    path: PathBuf,
    /// Whether new lines carry `disk:` tokens to feed the alias resolver
    track_disks: bool,
    cursor: LogCursor,
}

/// Captures one frame per tick into a session directory.
///
/// Owns the per-source cursors; a pipeline is built fresh for every
/// recording session, which resets all watermarks.
pub struct CapturePipeline {
    diskstats_path: PathBuf,
    sources: Vec<LogSource>,
    resolver: DiskAliasResolver,
}

impl CapturePipeline {
    pub fn new(config: &Config, mapping_path: PathBuf) -> Self {
        Self {
            diskstats_path: config.diskstats_path.clone(),
            sources: vec![
                LogSource {
                    artifact: LOG_ARTIFACT,
                    path: config.idle_log_path.clone(),
                    track_disks: true,
                    cursor: LogCursor::new(),
                },
                LogSource {
                    artifact: STDOUT_ARTIFACT,
                    path: config.idle_stdout_path.clone(),
                    track_disks: false,
                    cursor: LogCursor::new(),
                },
            ],
            resolver: DiskAliasResolver::new(mapping_path),
        }
    }

    /// Capture one frame under `session_dir`.
    ///
    /// Frames are named by epoch second; two ticks landing in the same
    /// second merge into one directory, last write wins.
    pub fn capture(&mut self, session_dir: &Path) -> Result<()> {
        let frame_dir = session_dir.join(Utc::now().timestamp().to_string());
        fs::create_dir_all(&frame_dir).with_context(|| {
            format!("Failed to create frame directory: {}", frame_dir.display())
        })?;

        let diskstats = fs::read(&self.diskstats_path).with_context(|| {
            format!(
                "Failed to read disk stats: {}",
                self.diskstats_path.display()
            )
        })?;
        write_artifact(&frame_dir, DISKSTATS_ARTIFACT, &diskstats)?;

        for source in &mut self.sources {
            let resolver = &self.resolver;
            let excerpt = if source.track_disks {
                source.cursor.drain(&source.path, |line| {
                    match disk_token(line) {
                        Some(disk) => resolver.resolve(&disk),
                        None => Ok(()),
                    }
                })?
            } else {
                source.cursor.drain(&source.path, |_| Ok(()))?
            };
            write_artifact(&frame_dir, source.artifact, excerpt.as_bytes())?;
        }

        Ok(())
    }
}

fn write_artifact(frame_dir: &Path, name: &str, content: &[u8]) -> Result<()> {
    let path = frame_dir.join(name);
    fs::write(&path, content)
        .with_context(|| format!("Failed to write frame artifact: {}", path.display()))
}
