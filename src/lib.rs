pub mod capture;
pub mod commands;
pub mod config;
pub mod daemon;
pub mod recorder;
pub mod store;
