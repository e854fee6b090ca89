//! One-shot client for the control socket, used by the CLI commands.

use anyhow::{bail, Context, Result};
use std::os::unix::net::UnixStream;
use std::path::Path;

use super::protocol::{read_message, write_message, Request, Response};

/// Send one request and read the daemon's response.
pub fn request(socket_path: &Path, request: &Request) -> Result<Response> {
    let mut stream = UnixStream::connect(socket_path).with_context(|| {
        format!(
            "Failed to connect to daemon socket: {} (is the daemon running?)",
            socket_path.display()
        )
    })?;

    write_message(&mut stream, request).context("Failed to send request")?;
    read_message(&mut stream).context("Failed to read response")
}

/// Like [`request`], but turns a `Response::Error` into an `Err`.
pub fn expect_ok(socket_path: &Path, req: &Request) -> Result<Response> {
    match request(socket_path, req)? {
        Response::Error { message } => bail!("Daemon returned error: {message}"),
        response => Ok(response),
    }
}
