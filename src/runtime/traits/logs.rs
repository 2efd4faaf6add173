// ABOUTME: Log operations trait for container runtimes.
// ABOUTME: Stream raw container output with filtering options.

use crate::types::ContainerId;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

/// Stream of container output chunks.
pub type LogStream = Pin<Box<dyn Stream<Item = Result<LogLine, LogError>> + Send>>;

/// Log streaming operations.
#[async_trait]
pub trait LogOps: Send + Sync {
    /// Stream logs from a container.
    async fn container_logs(
        &self,
        id: &ContainerId,
        opts: &LogOptions,
    ) -> Result<LogStream, LogError>;
}

/// Options for log streaming.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Include stdout.
    pub stdout: bool,
    /// Include stderr.
    pub stderr: bool,
    /// Follow log output (like `tail -f`).
    pub follow: bool,
    /// Show timestamps.
    pub timestamps: bool,
    /// Number of lines to show from end (`None` = all).
    pub tail: Option<u64>,
}

impl LogOptions {
    /// Follow combined stdout and stderr until the container stops.
    pub fn follow_all() -> Self {
        Self {
            stdout: true,
            stderr: true,
            follow: true,
            timestamps: false,
            tail: None,
        }
    }

    /// Create options for tailing the last N lines.
    pub fn tail(n: u64) -> Self {
        Self {
            stdout: true,
            stderr: true,
            follow: false,
            timestamps: false,
            tail: Some(n),
        }
    }
}

/// A chunk of container output, kept as raw bytes.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub data: Bytes,
    pub stream: LogStreamKind,
}

/// Which output stream a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStreamKind {
    Stdout,
    Stderr,
}

/// Errors from log operations.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("stream error: {0}")]
    StreamError(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
