// ABOUTME: Container engine access for Docker and Podman.
// ABOUTME: Capability traits, the bollard implementation, and socket detection.

mod bollard;
mod detection;
mod error;
pub mod traits;
mod types;

pub use self::bollard::BollardRuntime;
pub use detection::{DetectionError, detect_local, resolve_runtime};
pub use error::{ConnectionError, RuntimeError, RuntimeErrorKind};
pub use traits::*;
pub use types::{RuntimeConfig, RuntimeInfo, RuntimeType};

/// Resolve, connect to, and ping the local engine.
pub async fn connect(config: &RuntimeConfig) -> Result<BollardRuntime, RuntimeError> {
    let info = resolve_runtime(config)?;
    tracing::info!(
        runtime = %info.runtime_type,
        socket = %info.socket_path,
        "connecting to container engine"
    );
    let runtime = BollardRuntime::connect(&info)?;
    runtime.ping().await?;
    tracing::debug!(runtime = %runtime.runtime_type(), "container engine answered ping");
    Ok(runtime)
}
