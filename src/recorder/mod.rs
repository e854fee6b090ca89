//! Recording lifecycle and tick scheduling
//!
//! At most one recording session is active at a time. The recorder owns a
//! single tick thread per session; that thread owns the capture pipeline and
//! every log cursor, so no watermark is ever touched from two threads.

use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::capture::CapturePipeline;
use crate::config::Config;
use crate::store::DataDir;

/// How often the tick thread re-checks the shutdown flag while waiting
/// for the next deadline.
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Owns the single active recording and drives its periodic capture ticks.
pub struct Recorder {
    config: Config,
    active: Option<ActiveRecording>,
}

struct ActiveRecording {
    session_id: String,
    shutdown: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Recorder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            active: None,
        }
    }

    /// Start a recording session, returning its identifier.
    ///
    /// If a recording is already active it is stopped first; there is never
    /// more than one ticking pipeline. The session directory is named by
    /// the current epoch second; restarting within the same second reuses
    /// the directory (last write wins).
    pub fn start(&mut self) -> Result<String> {
        if self.active.is_some() {
            info!("recording already active, replacing it");
            self.stop();
        }

        let session_id = Utc::now().timestamp().to_string();
        let data_dir = DataDir::new(&self.config.data_dir);
        let session_dir = data_dir.session_path(&session_id);
        fs::create_dir_all(&session_dir).with_context(|| {
            format!(
                "Failed to create session directory: {}",
                session_dir.display()
            )
        })?;

        // A fresh pipeline resets every log cursor to unset
        let pipeline = CapturePipeline::new(&self.config, data_dir.mapping_path());
        let interval = self.config.capture_interval();
        let shutdown = Arc::new(AtomicBool::new(false));

        let thread_shutdown = Arc::clone(&shutdown);
        let handle = thread::spawn(move || {
            run_capture_loop(pipeline, session_dir, interval, &thread_shutdown);
        });

        info!(%session_id, "recording started");
        self.active = Some(ActiveRecording {
            session_id: session_id.clone(),
            shutdown,
            handle,
        });

        Ok(session_id)
    }

    /// Stop the active recording, if any.
    ///
    /// A tick already in progress finishes; only future ticks are
    /// cancelled. Idempotent.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.shutdown.store(true, Ordering::Relaxed);
            let _ = active.handle.join();
            info!(session_id = %active.session_id, "recording stopped");
        }
    }

    /// Whether a tick thread currently exists.
    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
    }

    /// Identifier of the active session, if any.
    pub fn active_session(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.session_id.as_str())
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Tick loop: capture immediately, then on a fixed deadline schedule.
///
/// A tick that overruns its interval pushes the schedule forward past the
/// missed deadlines - late ticks are skipped, never queued, so two captures
/// can never write into the same frame numbering space concurrently.
fn run_capture_loop(
    mut pipeline: CapturePipeline,
    session_dir: PathBuf,
    interval: Duration,
    shutdown: &AtomicBool,
) {
    let mut deadline = Instant::now();

    while !shutdown.load(Ordering::Relaxed) {
        if let Err(e) = pipeline.capture(&session_dir) {
            // Transient capture failures drop the tick; the schedule continues
            warn!("capture tick failed: {e:#}");
        }

        deadline = next_deadline(deadline, Instant::now(), interval);

        while !shutdown.load(Ordering::Relaxed) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(SHUTDOWN_POLL_INTERVAL.min(deadline - now));
        }
    }
}

/// Advance `deadline` by whole intervals until it lies strictly after `now`.
fn next_deadline(mut deadline: Instant, now: Instant, interval: Duration) -> Instant {
    deadline += interval;
    while deadline <= now {
        deadline += interval;
    }
    deadline
}
