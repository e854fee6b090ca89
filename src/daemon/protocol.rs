//! Control channel protocol
//!
//! Length-prefixed JSON messages over a Unix domain socket: 4-byte
//! big-endian length followed by the serialized payload. The transport is
//! trusted local-only; there is no authentication.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};

use crate::store::Frame;

/// Client request to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Request {
    /// Recording state plus the current disk alias mapping
    Status,
    /// All known session identifiers
    ListSessions,
    /// Every frame of one session, artifacts included
    GetSession { id: String },
    /// Start or stop the recording scheduler
    Record { action: RecordAction },
    /// Check if the daemon is alive
    Ping,
    /// Stop the recorder and shut the daemon down
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordAction {
    Start,
    Stop,
}

/// Daemon response to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Response {
    Ok,
    Error {
        message: String,
    },
    Status {
        recording: bool,
        disk_mapping: BTreeMap<String, String>,
    },
    Sessions {
        sessions: Vec<String>,
    },
    Frames {
        frames: Vec<Frame>,
    },
    Pong,
}

/// Write a length-prefixed JSON message to a stream.
pub fn write_message<T: Serialize, W: Write>(stream: &mut W, message: &T) -> Result<()> {
    let json = serde_json::to_vec(message).context("Failed to serialize message")?;
    let len = json.len() as u32;

    stream
        .write_all(&len.to_be_bytes())
        .context("Failed to write message length")?;
    stream
        .write_all(&json)
        .context("Failed to write message body")?;
    stream.flush().context("Failed to flush stream")?;

    Ok(())
}

/// Read a length-prefixed JSON message from a stream.
pub fn read_message<T: for<'de> Deserialize<'de>, R: Read>(stream: &mut R) -> Result<T> {
    let mut len_bytes = [0u8; 4];
    stream
        .read_exact(&mut len_bytes)
        .context("Failed to read message length")?;
    let len = u32::from_be_bytes(len_bytes) as usize;

    // Sanity check: prevent DOS via huge length claim (max 64 MB; sessions
    // with many frames can be large)
    if len > 64 * 1024 * 1024 {
        anyhow::bail!("Message too large: {len} bytes");
    }

    let mut json_bytes = vec![0u8; len];
    stream
        .read_exact(&mut json_bytes)
        .context("Failed to read message body")?;

    serde_json::from_slice(&json_bytes).context("Failed to deserialize message")
}
