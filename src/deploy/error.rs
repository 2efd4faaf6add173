// ABOUTME: Error types for deployment operations.
// ABOUTME: Covers validation, build, launch, lifecycle, and deadline failures.

use crate::runtime::{ContainerError, ImageError};
use std::time::Duration;

/// Errors that can end a deploy run.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Request has no repository URL.
    #[error("repositoryUrl is required")]
    MissingRepositoryUrl,

    /// Memory limit below the floor.
    #[error("memoryLimit must be at least {minimum} bytes, got {requested}")]
    MemoryBelowMinimum { requested: i64, minimum: i64 },

    /// CPU share below the floor.
    #[error("cpus must be at least {minimum}, got {requested}")]
    CpusBelowMinimum { requested: f64, minimum: f64 },

    /// Port is not a TCP port number.
    #[error("port must be a number between 1 and 65535, got {0:?}")]
    InvalidPort(String),

    /// Build context could not be packaged.
    #[error("failed to prepare build context: {0}")]
    BuildContext(String),

    /// Engine rejected or failed the build.
    #[error("failed to build image: {0}")]
    BuildFailed(String),

    /// No free host port could be obtained.
    #[error("failed to allocate host port: {0}")]
    PortAllocation(String),

    /// Container creation failed.
    #[error("failed to create container: {0}")]
    ContainerCreateFailed(String),

    /// Container start failed.
    #[error("failed to start container: {0}")]
    ContainerStartFailed(String),

    /// Engine errored while reporting on the started container.
    #[error("container {container} failed after start: {message}")]
    ContainerWaitFailed { container: String, message: String },

    /// An engine call exceeded its deadline.
    #[error("{stage} timed out after {after:?}")]
    Timeout { stage: &'static str, after: Duration },

    /// A log file could not be written.
    #[error("log file error: {0}")]
    LogFile(String),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    /// Rejected before any engine call.
    Validation,
    /// Engine unreachable or refused a build/create/start.
    Engine,
    /// Engine error after the container was started.
    Lifecycle,
    /// An engine call hit its deadline.
    Timeout,
    /// Local filesystem or socket failure.
    Io,
}

impl DeployError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::MissingRepositoryUrl
            | DeployError::MemoryBelowMinimum { .. }
            | DeployError::CpusBelowMinimum { .. }
            | DeployError::InvalidPort(_) => DeployErrorKind::Validation,
            DeployError::BuildFailed(_)
            | DeployError::ContainerCreateFailed(_)
            | DeployError::ContainerStartFailed(_) => DeployErrorKind::Engine,
            DeployError::ContainerWaitFailed { .. } => DeployErrorKind::Lifecycle,
            DeployError::Timeout { .. } => DeployErrorKind::Timeout,
            DeployError::BuildContext(_)
            | DeployError::PortAllocation(_)
            | DeployError::LogFile(_) => DeployErrorKind::Io,
        }
    }

    /// Whether the engine was never contacted.
    pub fn is_validation(&self) -> bool {
        self.kind() == DeployErrorKind::Validation
    }
}

impl From<ImageError> for DeployError {
    fn from(err: ImageError) -> Self {
        DeployError::BuildFailed(err.to_string())
    }
}

/// Extension trait for converting ContainerError to a stage-specific DeployError.
pub trait ContainerErrorExt {
    fn into_create_error(self) -> DeployError;
    fn into_start_error(self) -> DeployError;
}

impl ContainerErrorExt for ContainerError {
    fn into_create_error(self) -> DeployError {
        DeployError::ContainerCreateFailed(self.to_string())
    }

    fn into_start_error(self) -> DeployError {
        DeployError::ContainerStartFailed(self.to_string())
    }
}

/// Bound `future` by `after`, naming `stage` in the timeout error.
pub(crate) async fn with_deadline<T, F>(
    stage: &'static str,
    after: Duration,
    future: F,
) -> Result<T, DeployError>
where
    F: std::future::Future<Output = Result<T, DeployError>>,
{
    match tokio::time::timeout(after, future).await {
        Ok(result) => result,
        Err(_) => Err(DeployError::Timeout { stage, after }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_classified() {
        assert!(DeployError::MissingRepositoryUrl.is_validation());
        assert!(
            DeployError::CpusBelowMinimum {
                requested: 0.001,
                minimum: 0.01
            }
            .is_validation()
        );
        assert!(!DeployError::BuildFailed("boom".to_string()).is_validation());
    }

    #[test]
    fn container_errors_map_by_stage() {
        let err = ContainerError::ImageNotFound("x".to_string()).into_create_error();
        assert_eq!(err.kind(), DeployErrorKind::Engine);
        assert!(err.to_string().starts_with("failed to create container"));

        let err = ContainerError::Runtime("y".to_string()).into_start_error();
        assert!(err.to_string().starts_with("failed to start container"));
    }

    #[tokio::test]
    async fn deadline_reports_stage() {
        let result: Result<(), DeployError> = with_deadline(
            "image build",
            Duration::from_millis(10),
            futures::future::pending(),
        )
        .await;
        match result {
            Err(DeployError::Timeout { stage, .. }) => assert_eq!(stage, "image build"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
