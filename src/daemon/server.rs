use anyhow::{Context, Result};
use std::fs;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

use super::protocol::{read_message, write_message, RecordAction, Request, Response};
use crate::config::Config;
use crate::recorder::Recorder;
use crate::store::{mapping, sessions, DataDir};

/// Control server listening on a Unix domain socket.
///
/// Each accepted connection is served on its own thread; the recorder is the
/// only shared mutable state and sits behind a mutex, so a start arriving
/// while another client stops cannot interleave.
pub struct DaemonServer {
    socket_path: PathBuf,
    data_dir: DataDir,
    shutdown_flag: Arc<AtomicBool>,
    recorder: Arc<Mutex<Recorder>>,
}

impl DaemonServer {
    pub fn new(config: Config) -> Self {
        Self {
            socket_path: config.socket_path.clone(),
            data_dir: DataDir::new(&config.data_dir),
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            recorder: Arc::new(Mutex::new(Recorder::new(config))),
        }
    }

    /// Check if a daemon is already running against this data directory.
    pub fn is_running(data_dir: &Path) -> bool {
        let pid_path = DataDir::new(data_dir).pid_path();

        if let Some(pid) = Self::read_pid(data_dir) {
            // Check if the process exists by sending signal 0
            let pid_exists = unsafe { libc::kill(pid as i32, 0) == 0 };
            if !pid_exists {
                // PID file exists but the process is dead, clean up
                let _ = fs::remove_file(pid_path);
                return false;
            }
            true
        } else {
            false
        }
    }

    /// Read the PID recorded by a running daemon.
    pub fn read_pid(data_dir: &Path) -> Option<u32> {
        fs::read_to_string(DataDir::new(data_dir).pid_path())
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
    }

    /// Flag handed to signal handlers; setting it stops the accept loop.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown_flag)
    }

    /// Run the daemon in the foreground until shut down.
    ///
    /// Initializes the data directory, writes the PID file, removes a stale
    /// socket, then serves the accept loop. Any failure before the loop is
    /// fatal.
    pub fn run_foreground(&self) -> Result<()> {
        self.data_dir.init()?;

        fs::write(self.data_dir.pid_path(), format!("{}", std::process::id()))
            .context("Failed to write PID file")?;

        if self.socket_path.exists() {
            fs::remove_file(&self.socket_path).context("Failed to remove stale socket file")?;
        }

        self.run_server()
    }

    fn run_server(&self) -> Result<()> {
        let listener = UnixListener::bind(&self.socket_path).with_context(|| {
            format!("Failed to bind Unix socket: {}", self.socket_path.display())
        })?;

        // Non-blocking accepts so the loop can observe the shutdown flag
        listener
            .set_nonblocking(true)
            .context("Failed to set socket to non-blocking")?;

        info!(socket = %self.socket_path.display(), "control server listening");

        while !self.shutdown_flag.load(Ordering::Relaxed) {
            match listener.accept() {
                Ok((stream, _addr)) => {
                    let shutdown_flag = Arc::clone(&self.shutdown_flag);
                    let recorder = Arc::clone(&self.recorder);
                    let data_root = self.data_dir.root().to_path_buf();
                    let mapping_path = self.data_dir.mapping_path();

                    thread::spawn(move || {
                        if let Err(e) = Self::handle_client_connection(
                            stream,
                            shutdown_flag,
                            recorder,
                            data_root,
                            mapping_path,
                        ) {
                            warn!("client handler error: {e:#}");
                        }
                    });
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    error!("accept error: {e}");
                    break;
                }
            }
        }

        // Stop the recorder before tearing the socket down; an in-progress
        // tick finishes
        if let Ok(mut recorder) = self.recorder.lock() {
            recorder.stop();
        }

        self.cleanup()?;
        info!("control server stopped");
        Ok(())
    }

    /// Serve one client until it disconnects or the daemon shuts down.
    fn handle_client_connection(
        mut stream: UnixStream,
        shutdown_flag: Arc<AtomicBool>,
        recorder: Arc<Mutex<Recorder>>,
        data_root: PathBuf,
        mapping_path: PathBuf,
    ) -> Result<()> {
        loop {
            let request: Request = match read_message(&mut stream) {
                Ok(req) => req,
                Err(_) => {
                    // Client disconnected or sent a malformed message
                    break;
                }
            };

            let response = match request {
                Request::Ping => Response::Pong,
                Request::Status => Self::status_response(&recorder, &mapping_path),
                Request::ListSessions => match sessions::list_sessions(&data_root) {
                    Ok(sessions) => Response::Sessions { sessions },
                    Err(e) => error_response(e),
                },
                Request::GetSession { id } => match sessions::session_frames(&data_root, &id) {
                    Ok(frames) => Response::Frames { frames },
                    Err(e) => error_response(e),
                },
                Request::Record { action } => Self::record_response(&recorder, action),
                Request::Shutdown => {
                    write_message(&mut stream, &Response::Ok)?;
                    shutdown_flag.store(true, Ordering::Relaxed);
                    break;
                }
            };

            write_message(&mut stream, &response)?;
        }

        Ok(())
    }

    fn status_response(recorder: &Mutex<Recorder>, mapping_path: &Path) -> Response {
        let recording = match recorder.lock() {
            Ok(recorder) => recorder.is_running(),
            Err(_) => return lock_error_response(),
        };

        match mapping::read_mapping(mapping_path) {
            Ok(disk_mapping) => Response::Status {
                recording,
                disk_mapping,
            },
            Err(e) => error_response(e),
        }
    }

    fn record_response(recorder: &Mutex<Recorder>, action: RecordAction) -> Response {
        let mut recorder = match recorder.lock() {
            Ok(recorder) => recorder,
            Err(_) => return lock_error_response(),
        };

        match action {
            RecordAction::Start => match recorder.start() {
                Ok(_) => Response::Ok,
                Err(e) => error_response(e),
            },
            RecordAction::Stop => {
                recorder.stop();
                Response::Ok
            }
        }
    }

    /// Request graceful shutdown of the daemon.
    pub fn shutdown(&self) {
        self.shutdown_flag.store(true, Ordering::Relaxed);
    }

    /// Remove the socket and PID files.
    fn cleanup(&self) -> Result<()> {
        if self.socket_path.exists() {
            fs::remove_file(&self.socket_path).context("Failed to remove socket file")?;
        }
        let pid_path = self.data_dir.pid_path();
        if pid_path.exists() {
            fs::remove_file(&pid_path).context("Failed to remove PID file")?;
        }
        Ok(())
    }
}

impl Drop for DaemonServer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

fn error_response(e: anyhow::Error) -> Response {
    Response::Error {
        message: format!("{e:#}"),
    }
}

fn lock_error_response() -> Response {
    Response::Error {
        message: "Failed to acquire recorder lock".to_string(),
    }
}
