//! Read side of the session archive
//!
//! Sessions are directories named by their start time in epoch seconds, each
//! holding one directory per capture frame. A frame that is missing any of
//! its artifacts fails the whole listing: a partially written frame is an
//! error, not an empty result.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Raw diskstats snapshot inside a frame directory.
pub const DISKSTATS_ARTIFACT: &str = "diskstats";
/// Incremental hd-idle log excerpt inside a frame directory.
pub const LOG_ARTIFACT: &str = "log";
/// Incremental hd-idle stdout excerpt inside a frame directory.
pub const STDOUT_ARTIFACT: &str = "stdout";

/// One capture frame with its artifacts read back in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub id: String,
    pub diskstats: String,
    pub log: String,
    pub stdout: String,
}

/// List session identifiers (subdirectory names) under the data root.
///
/// Sorted by name; identifiers are fixed-width epoch seconds, so name order
/// is chronological order.
pub fn list_sessions(root: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(root)
        .with_context(|| format!("Failed to read data directory: {}", root.display()))?;

    let mut sessions = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        sessions.push(entry.file_name().to_string_lossy().into_owned());
    }
    sessions.sort();

    Ok(sessions)
}

/// Read every frame of a session, artifacts included.
pub fn session_frames(root: &Path, session_id: &str) -> Result<Vec<Frame>> {
    let session_dir = root.join(session_id);
    let entries = fs::read_dir(&session_dir)
        .with_context(|| format!("Failed to read session directory: {}", session_dir.display()))?;

    let mut frame_ids = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        frame_ids.push(entry.file_name().to_string_lossy().into_owned());
    }
    frame_ids.sort();

    let mut frames = Vec::new();
    for id in frame_ids {
        let frame_dir = session_dir.join(&id);
        frames.push(Frame {
            diskstats: read_artifact(&frame_dir, DISKSTATS_ARTIFACT)?,
            log: read_artifact(&frame_dir, LOG_ARTIFACT)?,
            stdout: read_artifact(&frame_dir, STDOUT_ARTIFACT)?,
            id,
        });
    }

    Ok(frames)
}

fn read_artifact(frame_dir: &Path, name: &str) -> Result<String> {
    let path = frame_dir.join(name);
    fs::read_to_string(&path)
        .with_context(|| format!("Failed to read frame artifact: {}", path.display()))
}
