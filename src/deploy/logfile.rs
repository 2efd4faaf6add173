// ABOUTME: Layout of the per-deploy log files under the logs directory.
// ABOUTME: <image>_ImageBuild_<ts>.log for builds, <image>_<ts>.log for containers.

use crate::types::ImageName;
use std::path::{Path, PathBuf};

/// Timestamp format used in log file names, e.g. `20240131235959`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// The directory deploy logs are written to.
#[derive(Debug, Clone)]
pub struct LogDir {
    root: PathBuf,
}

impl LogDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Create the directory if needed. Safe to race with other deploys.
    pub async fn ensure(&self) -> std::io::Result<()> {
        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o777);
        builder.create(&self.root).await
    }

    /// Path for the build log of `image`, stamped now.
    pub fn build_log(&self, image: &ImageName) -> PathBuf {
        self.root
            .join(format!("{}_ImageBuild_{}.log", image, timestamp()))
    }

    /// Path for the container output of `image`, stamped now.
    pub fn container_log(&self, image: &ImageName) -> PathBuf {
        self.root.join(format!("{}_{}.log", image, timestamp()))
    }

    /// Create (or truncate) a log file, creating the directory first.
    pub async fn create(&self, path: &Path) -> std::io::Result<tokio::fs::File> {
        self.ensure().await?;
        tokio::fs::File::create(path).await
    }
}

fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}
