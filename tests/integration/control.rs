//! Control channel scenarios: a live daemon server answering queries and
//! record commands over its Unix domain socket.

use std::thread;
use std::time::{Duration, Instant};

use hdtd::config::Config;
use hdtd::daemon::client;
use hdtd::daemon::protocol::{RecordAction, Request, Response};
use hdtd::daemon::DaemonServer;

use crate::helpers::test_env;

/// Serve a daemon on the config's socket and wait until it answers pings.
fn spawn_daemon(config: Config) -> thread::JoinHandle<()> {
    let socket_path = config.socket_path.clone();
    let handle = thread::spawn(move || {
        let server = DaemonServer::new(config);
        server.run_foreground().expect("Daemon server failed");
    });

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(Response::Pong) = client::request(&socket_path, &Request::Ping) {
            return handle;
        }
        assert!(Instant::now() < deadline, "daemon did not come up in time");
        thread::sleep(Duration::from_millis(50));
    }
}

#[test]
fn test_status_before_any_recording() {
    let env = test_env(600);
    let handle = spawn_daemon(env.config.clone());

    let response = client::expect_ok(&env.config.socket_path, &Request::Status)
        .expect("Status request failed");
    match response {
        Response::Status {
            recording,
            disk_mapping,
        } => {
            assert!(!recording);
            assert!(disk_mapping.is_empty());
        }
        _ => panic!("Expected Status response"),
    }

    client::expect_ok(&env.config.socket_path, &Request::Shutdown).expect("Shutdown failed");
    handle.join().expect("Daemon thread panicked");
}

#[test]
fn test_record_start_query_stop_round_trip() {
    let env = test_env(600);
    let handle = spawn_daemon(env.config.clone());
    let socket = &env.config.socket_path;

    client::expect_ok(socket, &Request::Record { action: RecordAction::Start })
        .expect("Record start failed");

    // The immediate first tick needs a moment to land its frame
    thread::sleep(Duration::from_millis(500));

    match client::expect_ok(socket, &Request::Status).expect("Status request failed") {
        Response::Status { recording, .. } => assert!(recording),
        _ => panic!("Expected Status response"),
    }

    let sessions = match client::expect_ok(socket, &Request::ListSessions)
        .expect("ListSessions failed")
    {
        Response::Sessions { sessions } => sessions,
        _ => panic!("Expected Sessions response"),
    };
    assert_eq!(sessions.len(), 1);

    let frames = match client::expect_ok(
        socket,
        &Request::GetSession {
            id: sessions[0].clone(),
        },
    )
    .expect("GetSession failed")
    {
        Response::Frames { frames } => frames,
        _ => panic!("Expected Frames response"),
    };
    assert!(!frames.is_empty());
    assert_eq!(frames[0].diskstats, crate::helpers::DISKSTATS_CONTENT);

    client::expect_ok(socket, &Request::Record { action: RecordAction::Stop })
        .expect("Record stop failed");

    match client::expect_ok(socket, &Request::Status).expect("Status request failed") {
        Response::Status { recording, .. } => assert!(!recording),
        _ => panic!("Expected Status response"),
    }

    // Stopping again is idempotent
    client::expect_ok(socket, &Request::Record { action: RecordAction::Stop })
        .expect("Second record stop failed");

    client::expect_ok(socket, &Request::Shutdown).expect("Shutdown failed");
    handle.join().expect("Daemon thread panicked");
}

#[test]
fn test_get_unknown_session_is_error() {
    let env = test_env(600);
    let handle = spawn_daemon(env.config.clone());

    let response = client::request(
        &env.config.socket_path,
        &Request::GetSession {
            id: "1700000000".to_string(),
        },
    )
    .expect("Request failed");

    match response {
        Response::Error { message } => assert!(message.contains("session")),
        _ => panic!("Expected Error response"),
    }

    client::expect_ok(&env.config.socket_path, &Request::Shutdown).expect("Shutdown failed");
    handle.join().expect("Daemon thread panicked");
}

#[test]
fn test_shutdown_stops_active_recording() {
    let env = test_env(600);
    let handle = spawn_daemon(env.config.clone());

    client::expect_ok(
        &env.config.socket_path,
        &Request::Record { action: RecordAction::Start },
    )
    .expect("Record start failed");

    client::expect_ok(&env.config.socket_path, &Request::Shutdown).expect("Shutdown failed");
    handle.join().expect("Daemon thread panicked");

    // Socket and PID file are cleaned up on the way out
    assert!(!env.config.socket_path.exists());
    assert!(!env.config.data_dir.join("hdtd.pid").exists());
}
