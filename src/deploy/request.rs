// ABOUTME: Wire types for deploy requests and their outcomes.
// ABOUTME: DeployRequest in, DockerResponse (error or DeploymentInfo) out.

use serde::{Deserialize, Serialize};

/// A caller's request to build and run a repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    pub repository_url: Option<String>,
    pub build_command: Option<String>,
    pub start_command: Option<String>,
    /// Port the service listens on inside the container.
    pub port: Option<String>,
    #[serde(default)]
    pub branch: String,
    /// Memory limit in bytes.
    pub memory_limit: Option<i64>,
    /// Fractional CPU count.
    pub cpus: Option<f64>,
    pub mounts: Option<Vec<Mount>>,
}

/// A volume attachment as the caller declares it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mount {
    pub source: String,
    pub target: String,
    /// Case-insensitive kind; unknown values mean a bind mount.
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Handle to a started deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentInfo {
    pub image_name: String,
    /// Host port the container's service is published on.
    pub port: String,
}

/// The single outcome of one deploy run.
///
/// Serialises as `{"error": "..."}` or `{"info": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DockerResponse {
    Error(String),
    Info(DeploymentInfo),
}

impl DockerResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, DockerResponse::Error(_))
    }

    pub fn info(&self) -> Option<&DeploymentInfo> {
        match self {
            DockerResponse::Info(info) => Some(info),
            DockerResponse::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            DockerResponse::Error(message) => Some(message),
            DockerResponse::Info(_) => None,
        }
    }
}
