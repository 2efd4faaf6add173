// ABOUTME: Runtime error types with SNAFU pattern.
// ABOUTME: Unifies detection and connection errors for programmatic handling.

use snafu::Snafu;

use super::detection::DetectionError;

/// Failure to reach the engine over its socket.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("failed to connect to {socket}: {message}")]
    Connect { socket: String, message: String },

    #[error("engine did not answer ping: {0}")]
    Ping(String),
}

/// Unified runtime error for detection and connection failures.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RuntimeError {
    #[snafu(display("runtime detection failed: {source}"))]
    Detection { source: DetectionError },

    #[snafu(display("runtime connection failed: {source}"))]
    Connection { source: ConnectionError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    /// No container runtime found on the system.
    NoRuntimeFound,
    /// A configured socket path does not exist.
    SocketMissing,
    /// Failed to connect to runtime socket.
    ConnectionFailed,
    /// Connected, but the engine did not respond.
    Unresponsive,
}

impl RuntimeError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> RuntimeErrorKind {
        match self {
            RuntimeError::Detection { source } => match source {
                DetectionError::NoRuntimeFound => RuntimeErrorKind::NoRuntimeFound,
                DetectionError::SocketMissing(_) => RuntimeErrorKind::SocketMissing,
            },
            RuntimeError::Connection { source } => match source {
                ConnectionError::Connect { .. } => RuntimeErrorKind::ConnectionFailed,
                ConnectionError::Ping(_) => RuntimeErrorKind::Unresponsive,
            },
        }
    }
}

impl From<DetectionError> for RuntimeError {
    fn from(source: DetectionError) -> Self {
        RuntimeError::Detection { source }
    }
}

impl From<ConnectionError> for RuntimeError {
    fn from(source: ConnectionError) -> Self {
        RuntimeError::Connection { source }
    }
}
