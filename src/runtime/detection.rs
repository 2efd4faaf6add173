// ABOUTME: Runtime detection for the local container engine.
// ABOUTME: Checks Podman sockets first, then Docker, unless config pins one.

use super::types::{RuntimeConfig, RuntimeInfo, RuntimeType};
use std::path::Path;

/// Error during runtime detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("no container runtime found (checked Podman and Docker sockets)")]
    NoRuntimeFound,

    #[error("configured socket does not exist: {0}")]
    SocketMissing(String),
}

const ROOTFUL_PODMAN: &str = "/run/podman/podman.sock";
const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Detect container runtime on the local system.
///
/// Detection order:
/// 1. Rootless Podman socket (`/run/user/$UID/podman/podman.sock`)
/// 2. Rootful Podman socket (`/run/podman/podman.sock`)
/// 3. Docker socket (`/var/run/docker.sock`)
pub fn detect_local() -> Result<RuntimeInfo, DetectionError> {
    if let Some(uid) = get_uid() {
        let rootless_socket = format!("/run/user/{}/podman/podman.sock", uid);
        if Path::new(&rootless_socket).exists() {
            return Ok(RuntimeInfo {
                runtime_type: RuntimeType::Podman,
                socket_path: rootless_socket,
            });
        }
    }

    if Path::new(ROOTFUL_PODMAN).exists() {
        return Ok(RuntimeInfo {
            runtime_type: RuntimeType::Podman,
            socket_path: ROOTFUL_PODMAN.to_string(),
        });
    }

    if Path::new(DOCKER_SOCKET).exists() {
        return Ok(RuntimeInfo {
            runtime_type: RuntimeType::Docker,
            socket_path: DOCKER_SOCKET.to_string(),
        });
    }

    Err(DetectionError::NoRuntimeFound)
}

/// Resolve the runtime to use, honouring explicit configuration.
///
/// An explicit socket wins outright. An explicit runtime type without a
/// socket uses that runtime's well-known rootful socket.
pub fn resolve_runtime(config: &RuntimeConfig) -> Result<RuntimeInfo, DetectionError> {
    match (&config.socket, config.runtime) {
        (Some(socket), runtime) => {
            if !Path::new(socket).exists() {
                return Err(DetectionError::SocketMissing(socket.clone()));
            }
            Ok(RuntimeInfo {
                runtime_type: runtime.unwrap_or(RuntimeType::Docker),
                socket_path: socket.clone(),
            })
        }
        (None, Some(runtime_type)) => {
            let socket = default_socket(runtime_type);
            if !Path::new(socket).exists() {
                return Err(DetectionError::SocketMissing(socket.to_string()));
            }
            Ok(RuntimeInfo {
                runtime_type,
                socket_path: socket.to_string(),
            })
        }
        (None, None) => detect_local(),
    }
}

fn default_socket(runtime_type: RuntimeType) -> &'static str {
    match runtime_type {
        RuntimeType::Docker => DOCKER_SOCKET,
        RuntimeType::Podman => ROOTFUL_PODMAN,
    }
}

fn get_uid() -> Option<String> {
    std::env::var("UID").ok().or_else(|| {
        // Fall back to reading /proc/self/status
        std::fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|s| {
                s.lines()
                    .find(|l| l.starts_with("Uid:"))
                    .and_then(|l| l.split_whitespace().nth(1))
                    .map(|s| s.to_string())
            })
    })
}
