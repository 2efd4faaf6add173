// ABOUTME: Bollard-based container runtime implementation.
// ABOUTME: Talks to Docker or Podman over the Docker-compatible API.

use crate::runtime::error::ConnectionError;
use crate::runtime::traits::{
    BuildOutput, BuildSpec, BuildStream, ContainerConfig, ContainerError, ContainerOps,
    ImageError, ImageOps, LogError, LogLine, LogOps, LogOptions, LogStream, LogStreamKind,
    MountKind,
};
use crate::runtime::types::{RuntimeInfo, RuntimeType};
use crate::types::ContainerId;
use async_trait::async_trait;
use bollard::Docker;
use bollard::models::{BuildInfo, ContainerCreateBody, HostConfig, Mount, MountTypeEnum, PortBinding};
use bollard::query_parameters::{
    BuildImageOptions, CreateContainerOptions, LogsOptions, RemoveContainerOptions,
    StopContainerOptions, WaitContainerOptions,
};
use bytes::Bytes;
use futures::StreamExt;
use http_body_util::{Either, Full};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;

/// Build output items buffered between the engine and the build log.
const BUILD_CHANNEL_CAPACITY: usize = 64;

/// Client-side timeout bollard applies to each request, in seconds.
/// Builds stream for a long time, so this is generous; per-stage deadlines
/// are enforced by the deployment pipeline.
const CLIENT_TIMEOUT_SECS: u64 = 3600;

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_container_create_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::ImageNotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ContainerError::AlreadyExists(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_start_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 304 => ContainerError::AlreadyRunning(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_stop_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 304 => ContainerError::NotRunning(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_not_found_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

/// Translate one item of the engine's build stream.
///
/// bollard reports an in-band `errorDetail` as `DockerStreamError`.
fn build_output(
    item: Result<BuildInfo, bollard::errors::Error>,
) -> Result<BuildOutput, ImageError> {
    match item {
        Ok(info) => {
            if let Some(detail) = info.error_detail {
                let message = detail
                    .message
                    .unwrap_or_else(|| "unknown build error".to_string());
                return Ok(BuildOutput::Error(message));
            }
            Ok(BuildOutput::Log(info.stream.or(info.status).unwrap_or_default()))
        }
        Err(bollard::errors::Error::DockerStreamError { error }) => Ok(BuildOutput::Error(error)),
        Err(e) => Err(ImageError::BuildFailed(e.to_string())),
    }
}

fn mount_type(kind: MountKind) -> MountTypeEnum {
    match kind {
        MountKind::Bind => MountTypeEnum::BIND,
        MountKind::Volume => MountTypeEnum::VOLUME,
        MountKind::Cluster => MountTypeEnum::CLUSTER,
        MountKind::NamedPipe => MountTypeEnum::NPIPE,
        MountKind::Tmpfs => MountTypeEnum::TMPFS,
    }
}

// =============================================================================
// BollardRuntime
// =============================================================================

/// Container runtime implementation using bollard.
///
/// Supports both Docker and Podman via Docker-compatible API.
pub struct BollardRuntime {
    client: Docker,
    runtime_type: RuntimeType,
}

impl BollardRuntime {
    /// Create a new BollardRuntime from a Docker client.
    pub fn new(client: Docker, runtime_type: RuntimeType) -> Self {
        Self {
            client,
            runtime_type,
        }
    }

    /// Connect to a container runtime using detected runtime info.
    ///
    /// Use with `resolve_runtime()` or `detect_local()`.
    pub fn connect(info: &RuntimeInfo) -> Result<Self, ConnectionError> {
        let client = Docker::connect_with_unix(
            &info.socket_path,
            CLIENT_TIMEOUT_SECS,
            bollard::API_DEFAULT_VERSION,
        )
        .map_err(|e| ConnectionError::Connect {
            socket: info.socket_path.clone(),
            message: e.to_string(),
        })?;
        Ok(Self::new(client, info.runtime_type))
    }

    /// Get the runtime type (Docker or Podman).
    pub fn runtime_type(&self) -> RuntimeType {
        self.runtime_type
    }

    /// Check the engine is answering requests.
    pub async fn ping(&self) -> Result<(), ConnectionError> {
        self.client
            .ping()
            .await
            .map_err(|e| ConnectionError::Ping(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ImageOps for BollardRuntime {
    async fn build_image(&self, spec: &BuildSpec) -> Result<BuildStream, ImageError> {
        let options = BuildImageOptions {
            dockerfile: "Dockerfile".to_string(),
            t: Some(spec.tag.clone()),
            nocache: spec.no_cache,
            rm: spec.remove_intermediate,
            buildargs: if spec.build_args.is_empty() {
                None
            } else {
                Some(spec.build_args.clone())
            },
            ..Default::default()
        };

        let body = Either::Left(Full::new(spec.context.clone()));

        // The engine's stream borrows the client, so it is driven on its own
        // task with an owned handle and forwarded through a channel.
        let client = self.client.clone();
        let (tx, mut rx) = mpsc::channel(BUILD_CHANNEL_CAPACITY);
        tokio::spawn(async move {
            let mut stream = client.build_image(options, None, Some(body));
            while let Some(item) = stream.next().await {
                if tx.send(build_output(item)).await.is_err() {
                    break;
                }
            }
        });

        Ok(Box::pin(futures::stream::poll_fn(move |cx| rx.poll_recv(cx))))
    }
}

#[async_trait]
impl ContainerOps for BollardRuntime {
    async fn create_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<ContainerId, ContainerError> {
        let mut host_config = HostConfig {
            memory: config.resources.memory,
            nano_cpus: config.resources.nano_cpus,
            network_mode: config.network_mode.clone(),
            ..Default::default()
        };

        let mounts: Vec<Mount> = config
            .mounts
            .iter()
            .map(|m| Mount {
                source: Some(m.source.clone()),
                target: Some(m.target.clone()),
                typ: Some(mount_type(m.kind)),
                ..Default::default()
            })
            .collect();
        if !mounts.is_empty() {
            host_config.mounts = Some(mounts);
        }

        let mut port_bindings: HashMap<String, Option<Vec<PortBinding>>> = HashMap::new();
        let mut exposed_ports: Vec<String> = Vec::new();
        for port in &config.ports {
            exposed_ports.push(port.container_port.clone());
            port_bindings
                .entry(port.container_port.clone())
                .or_insert_with(|| Some(Vec::new()))
                .get_or_insert_with(Vec::new)
                .push(PortBinding {
                    host_ip: port.host_ip.clone(),
                    host_port: Some(port.host_port.to_string()),
                });
        }
        if !port_bindings.is_empty() {
            host_config.port_bindings = Some(port_bindings);
        }

        let container_config = ContainerCreateBody {
            image: Some(config.image.clone()),
            host_config: Some(host_config),
            exposed_ports: if exposed_ports.is_empty() {
                None
            } else {
                Some(exposed_ports)
            },
            ..Default::default()
        };

        let response = self
            .client
            .create_container(None::<CreateContainerOptions>, container_config)
            .await
            .map_err(map_container_create_error)?;

        for warning in &response.warnings {
            tracing::warn!(container = %response.id, "engine warning: {}", warning);
        }

        Ok(ContainerId::new(response.id))
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.client
            .start_container(
                id.as_str(),
                None::<bollard::query_parameters::StartContainerOptions>,
            )
            .await
            .map_err(map_container_start_error)
    }

    async fn wait_container(&self, id: &ContainerId) -> Result<i64, ContainerError> {
        let opts = WaitContainerOptions {
            condition: "next-exit".to_string(),
        };

        let mut stream = self.client.wait_container(id.as_str(), Some(opts));
        match stream.next().await {
            Some(Ok(response)) => Ok(response.status_code),
            // bollard reports a non-zero exit as an error carrying the code
            Some(Err(bollard::errors::Error::DockerContainerWaitError { code, .. })) => Ok(code),
            Some(Err(e)) => Err(map_container_not_found_error(e)),
            None => Err(ContainerError::Runtime(format!(
                "wait stream for {} ended without a status",
                id
            ))),
        }
    }

    async fn stop_container(
        &self,
        id: &ContainerId,
        timeout: Duration,
    ) -> Result<(), ContainerError> {
        let opts = StopContainerOptions {
            t: Some(timeout.as_secs() as i32),
            signal: None,
        };

        self.client
            .stop_container(id.as_str(), Some(opts))
            .await
            .map_err(map_container_stop_error)
    }

    async fn remove_container(&self, id: &ContainerId, force: bool) -> Result<(), ContainerError> {
        let opts = RemoveContainerOptions {
            force,
            ..Default::default()
        };

        self.client
            .remove_container(id.as_str(), Some(opts))
            .await
            .map_err(map_container_not_found_error)
    }
}

#[async_trait]
impl LogOps for BollardRuntime {
    async fn container_logs(
        &self,
        id: &ContainerId,
        opts: &LogOptions,
    ) -> Result<LogStream, LogError> {
        let log_opts = LogsOptions {
            stdout: opts.stdout,
            stderr: opts.stderr,
            follow: opts.follow,
            timestamps: opts.timestamps,
            tail: opts
                .tail
                .map(|n| n.to_string())
                .unwrap_or_else(|| "all".to_string()),
            ..Default::default()
        };

        let stream = self.client.logs(id.as_str(), Some(log_opts));

        let mapped_stream = stream.map(|result| {
            result
                .map(|output| {
                    let (stream, data): (LogStreamKind, Bytes) = match output {
                        bollard::container::LogOutput::StdOut { message } => {
                            (LogStreamKind::Stdout, message)
                        }
                        bollard::container::LogOutput::StdErr { message } => {
                            (LogStreamKind::Stderr, message)
                        }
                        bollard::container::LogOutput::StdIn { message } => {
                            (LogStreamKind::Stdout, message)
                        }
                        bollard::container::LogOutput::Console { message } => {
                            (LogStreamKind::Stdout, message)
                        }
                    };
                    LogLine { data, stream }
                })
                .map_err(|e| LogError::StreamError(e.to_string()))
        });

        Ok(Box::pin(mapped_stream))
    }
}
