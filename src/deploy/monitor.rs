// ABOUTME: Lifecycle stage: races container exit against a grace period.
// ABOUTME: A still-running container gets a detached task copying its output to a log file.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::runtime::{ContainerOps, LogOps, LogOptions, LogStream};
use crate::types::{ContainerId, ImageName};

use super::Deployment;
use super::error::{DeployError, with_deadline};
use super::logfile::LogDir;
use super::port::PortAllocator;
use super::state::{Completed, ContainerStarted};

/// Result type for transitions that hand the deployment back on failure.
pub type TransitionResult<T, S> = Result<Deployment<T>, (Deployment<S>, DeployError)>;

impl Deployment<ContainerStarted> {
    /// Wait up to `exit_grace` for the container to exit or the engine to error.
    ///
    /// An exit inside the window is recorded and is not an error. A container
    /// still running when the window closes gets its combined output streamed
    /// to a log file by a background task. With a zero grace period the
    /// engine is polled once without waiting.
    ///
    /// The host port reservation is dropped once the container is known to
    /// have stopped: on an exit inside the window, or when the engine closes
    /// the output stream.
    ///
    /// # Errors
    ///
    /// `ContainerWaitFailed` if the engine reports an error for the
    /// container. The deployment is returned so the caller can clean up.
    pub async fn monitor<R>(
        self,
        runtime: &R,
        logs: &LogDir,
        ports: &Arc<PortAllocator>,
        exit_grace: Duration,
        engine_deadline: Duration,
    ) -> TransitionResult<Completed, ContainerStarted>
    where
        R: ContainerOps + LogOps + ?Sized,
    {
        let container_id = self.state.container_id.clone();

        let exit_code =
            match tokio::time::timeout(exit_grace, runtime.wait_container(&container_id)).await {
                Ok(Ok(code)) => {
                    info!(
                        image = %self.image_name,
                        container = %container_id.short(),
                        exit_code = code,
                        "container exited during startup window"
                    );
                    ports.release(self.state.host_port);
                    Some(code)
                }
                Ok(Err(e)) => {
                    let err = DeployError::ContainerWaitFailed {
                        container: container_id.short().to_string(),
                        message: e.to_string(),
                    };
                    return Err((self, err));
                }
                Err(_) => {
                    self.attach_log_drain(runtime, logs, ports, engine_deadline).await;
                    None
                }
            };

        let host_port = self.state.host_port;
        Ok(self.transition(Completed {
            container_id,
            host_port,
            exit_code,
        }))
    }

    async fn attach_log_drain<R: LogOps + ?Sized>(
        &self,
        runtime: &R,
        logs: &LogDir,
        ports: &Arc<PortAllocator>,
        deadline: Duration,
    ) {
        let container_id = &self.state.container_id;
        let attached = with_deadline("log attach", deadline, async {
            runtime
                .container_logs(container_id, &LogOptions::follow_all())
                .await
                .map_err(|e| DeployError::LogFile(e.to_string()))
        })
        .await;

        match attached {
            Ok(stream) => {
                let path = logs.container_log(&self.image_name);
                debug!(container = %container_id.short(), log = %path.display(), "streaming container output");
                tokio::spawn(drain_logs(
                    stream,
                    logs.clone(),
                    path,
                    self.image_name.clone(),
                    container_id.clone(),
                    (Arc::clone(ports), self.state.host_port),
                ));
            }
            Err(e) => warn!(
                container = %container_id.short(),
                "container output will not be captured: {}", e
            ),
        }
    }

    /// Stop and remove the container, then release its host port. Best effort.
    pub async fn cleanup<R: ContainerOps + ?Sized>(
        &self,
        runtime: &R,
        ports: &PortAllocator,
        stop_timeout: Duration,
        deadline: Duration,
    ) {
        let id = &self.state.container_id;

        let stopped = tokio::time::timeout(deadline, runtime.stop_container(id, stop_timeout)).await;
        match stopped {
            Ok(Err(e)) => debug!(container = %id.short(), "stop during cleanup: {}", e),
            Err(_) => debug!(container = %id.short(), "stop during cleanup timed out"),
            Ok(Ok(())) => {}
        }

        match tokio::time::timeout(deadline, runtime.remove_container(id, true)).await {
            Ok(Ok(())) => {
                info!(container = %id.short(), "removed failed container");
                ports.release(self.state.host_port);
            }
            Ok(Err(e)) => warn!(container = %id.short(), "failed to remove container: {}", e),
            Err(_) => warn!(container = %id.short(), "removing container timed out"),
        }
    }
}

/// Copy container output to `path` until the stream ends. Errors end the copy.
///
/// The engine ends a follow stream when the container stops, which frees
/// its host port. A stream that fails instead keeps the reservation.
async fn drain_logs(
    mut stream: LogStream,
    logs: LogDir,
    path: PathBuf,
    image: ImageName,
    container: ContainerId,
    (ports, host_port): (Arc<PortAllocator>, u16),
) {
    let mut file = match logs.create(&path).await {
        Ok(file) => Some(file),
        Err(e) => {
            warn!(image = %image, log = %path.display(), "cannot create container log: {}", e);
            None
        }
    };

    let mut written: u64 = 0;
    let mut stopped = true;
    while let Some(chunk) = stream.next().await {
        let line = match chunk {
            Ok(line) => line,
            Err(e) => {
                warn!(container = %container.short(), "container log stream failed: {}", e);
                stopped = false;
                break;
            }
        };
        if let Some(out) = file.as_mut()
            && let Err(e) = out.write_all(&line.data).await
        {
            warn!(log = %path.display(), "container log write failed, discarding the rest: {}", e);
            file = None;
            continue;
        }
        written += line.data.len() as u64;
    }

    if let Some(mut out) = file
        && let Err(e) = out.flush().await
    {
        warn!(log = %path.display(), "container log flush failed: {}", e);
    }
    debug!(container = %container.short(), bytes = written, "container output stream closed");

    if stopped {
        ports.release(host_port);
    }
}
