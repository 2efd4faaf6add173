// ABOUTME: Library root for ascend - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod deploy;
pub mod error;
pub mod runtime;
pub mod server;
pub mod types;
