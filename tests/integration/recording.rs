//! End-to-end recording scenarios: scheduler → capture pipeline → session
//! store, read back through the store's query side.

use serial_test::serial;
use std::fs;
use std::os::unix::fs::symlink;
use std::thread;
use std::time::Duration;

use hdtd::recorder::Recorder;
use hdtd::store::{mapping, sessions};

use crate::helpers::{test_env, DISKSTATS_CONTENT};

#[test]
fn test_first_tick_records_snapshot_with_empty_excerpts() {
    let env = test_env(600);
    env.append_idle_log("date: 2024-01-01, disk: sda, running: 1");

    let mut recorder = Recorder::new(env.config.clone());
    let session_id = recorder.start().expect("Failed to start recording");
    thread::sleep(Duration::from_millis(300));
    recorder.stop();

    let ids = sessions::list_sessions(&env.config.data_dir).expect("Failed to list sessions");
    assert_eq!(ids, vec![session_id.clone()]);

    let frames =
        sessions::session_frames(&env.config.data_dir, &session_id).expect("Failed to read frames");
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].diskstats, DISKSTATS_CONTENT);
    // Pre-existing log content is never replayed into the first frame
    assert_eq!(frames[0].log, "");
    assert_eq!(frames[0].stdout, "");
}

#[test]
#[serial]
fn test_later_ticks_capture_only_appended_lines() {
    let env = test_env(2);
    env.append_idle_log("date: 2024-01-01, disk: sda, running: 1");

    let mut recorder = Recorder::new(env.config.clone());
    let session_id = recorder.start().expect("Failed to start recording");

    // Let the first tick land, then append between ticks
    thread::sleep(Duration::from_millis(500));
    env.append_idle_log("date: 2024-01-01, disk: sda, running: 0");
    env.append_idle_stdout("sda spindown");

    thread::sleep(Duration::from_millis(2500));
    recorder.stop();

    let frames =
        sessions::session_frames(&env.config.data_dir, &session_id).expect("Failed to read frames");
    assert!(frames.len() >= 2, "expected at least two frames");

    let combined_log: String = frames.iter().map(|f| f.log.as_str()).collect();
    assert_eq!(combined_log, "date: 2024-01-01, disk: sda, running: 0\n");
    let combined_stdout: String = frames.iter().map(|f| f.stdout.as_str()).collect();
    assert_eq!(combined_stdout, "sda spindown\n");
}

#[test]
#[serial]
fn test_disk_aliases_recorded_once_across_session() {
    let env = test_env(2);
    let link = env.temp.path().join("by-label-backup");
    symlink("/dev/sdb", &link).expect("Failed to create symlink");

    let mut recorder = Recorder::new(env.config.clone());
    recorder.start().expect("Failed to start recording");

    thread::sleep(Duration::from_millis(500));
    env.append_idle_log(&format!("disk: {}, running: 1", link.display()));
    thread::sleep(Duration::from_millis(2000));
    env.append_idle_log(&format!("disk: {}, running: 0", link.display()));
    thread::sleep(Duration::from_millis(2000));
    recorder.stop();

    let mapping_path = env.config.data_dir.join("disk_mapping.txt");
    let disk_mapping = mapping::read_mapping(&mapping_path).expect("Failed to read mapping");
    assert_eq!(disk_mapping.len(), 1);
    assert_eq!(disk_mapping[&link.display().to_string()], "sdb");

    // Exactly one line despite the path appearing in two ticks
    let raw = fs::read_to_string(&mapping_path).expect("Failed to read mapping file");
    assert_eq!(raw.lines().count(), 1);
}

#[test]
fn test_unreadable_diskstats_drops_ticks_but_recorder_survives() {
    let env = test_env(600);
    fs::remove_file(&env.config.diskstats_path).expect("Failed to remove diskstats");

    let mut recorder = Recorder::new(env.config.clone());
    let session_id = recorder.start().expect("Failed to start recording");
    thread::sleep(Duration::from_millis(300));

    // The tick failed but the scheduler is still alive
    assert!(recorder.is_running());
    recorder.stop();

    // The aborted tick left no complete frame
    let result = sessions::session_frames(&env.config.data_dir, &session_id);
    match result {
        Ok(frames) => assert!(frames.is_empty()),
        // The frame directory exists without artifacts; listing it is an error
        Err(_) => {}
    }
}

#[test]
fn test_new_session_resets_cursors() {
    let env = test_env(600);
    env.append_idle_log("old line");

    let mut recorder = Recorder::new(env.config.clone());
    recorder.start().expect("Failed to start recording");
    thread::sleep(Duration::from_millis(300));
    recorder.stop();

    // Lines appended between sessions are pre-existing content for the next
    // session and must be suppressed by its first tick
    env.append_idle_log("between sessions");
    thread::sleep(Duration::from_millis(1100));

    let second = recorder.start().expect("Failed to start recording");
    thread::sleep(Duration::from_millis(300));
    recorder.stop();

    let frames =
        sessions::session_frames(&env.config.data_dir, &second).expect("Failed to read frames");
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].log, "");
}
