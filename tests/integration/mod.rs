//! Integration tests for the recording daemon
//!
//! These tests exercise end-to-end behavior: the recording scheduler writing
//! frames into a real data directory, and the control server answering
//! queries over its Unix domain socket.

pub mod control;
pub mod recording;
