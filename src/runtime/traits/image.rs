// ABOUTME: Image operations trait for container runtimes.
// ABOUTME: Builds images from a tarred context and streams the build log.

use super::shared_types::BuildSpec;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Stream of build output as the engine reports it.
pub type BuildStream = Pin<Box<dyn Stream<Item = Result<BuildOutput, ImageError>> + Send>>;

/// Image operations.
#[async_trait]
pub trait ImageOps: Send + Sync {
    /// Submit a build. The build runs while the returned stream is drained.
    async fn build_image(&self, spec: &BuildSpec) -> Result<BuildStream, ImageError>;
}

/// One item of build output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutput {
    /// Progress text, verbatim.
    Log(String),
    /// An error the engine reported in-band; the build has failed.
    Error(String),
}

/// Errors from image operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("build failed: {0}")]
    BuildFailed(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
