// ABOUTME: In-memory container runtime with scripted outcomes.
// ABOUTME: Records every engine call so tests can assert on what the pipeline asked for.

use ascend::config::Config;
use ascend::deploy::{Orchestrator, PortAllocator};
use ascend::runtime::{
    BuildOutput, BuildSpec, BuildStream, ContainerConfig, ContainerError, ContainerOps,
    ImageError, ImageOps, LogError, LogLine, LogOps, LogOptions, LogStream, LogStreamKind,
};
use ascend::types::ContainerId;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, stream};
use parking_lot::Mutex;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// How the build call behaves.
#[derive(Debug, Clone)]
pub enum BuildBehavior {
    /// Stream these lines, then finish.
    Succeed(Vec<String>),
    /// Stream one line, then report an in-band build error.
    EngineError(String),
    /// Stream one line, then fail the stream itself.
    StreamFailure(String),
    /// Refuse the build request outright.
    Refuse(String),
    /// Never produce output.
    Hang,
}

/// What waiting on a started container reports.
#[derive(Debug, Clone)]
pub enum WaitBehavior {
    /// Still running: the wait never resolves.
    Running,
    /// Already exited with this code.
    Exited(i64),
    /// Engine error while waiting.
    Fails(String),
}

#[derive(Debug, Clone)]
pub struct Behavior {
    pub build: BuildBehavior,
    pub create_fails: bool,
    pub start_fails: bool,
    pub wait: WaitBehavior,
    pub container_output: Vec<String>,
    /// Keep the output stream open after the lines, like a live container.
    pub output_stays_open: bool,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            build: BuildBehavior::Succeed(vec![
                "Step 1/2 : FROM golang:1.22-alpine\n".to_string(),
                "Successfully built 0123456789ab\n".to_string(),
            ]),
            create_fails: false,
            start_fails: false,
            wait: WaitBehavior::Running,
            container_output: vec!["listening on :9090\n".to_string()],
            output_stays_open: false,
        }
    }
}

#[derive(Default)]
pub struct MockRuntime {
    behavior: Behavior,
    next_id: AtomicUsize,
    calls: AtomicUsize,
    pub builds: Mutex<Vec<BuildSpec>>,
    pub creates: Mutex<Vec<ContainerConfig>>,
    pub started: Mutex<Vec<ContainerId>>,
    pub stopped: Mutex<Vec<ContainerId>>,
    pub removed: Mutex<Vec<ContainerId>>,
    pub log_requests: Mutex<Vec<ContainerId>>,
}

impl MockRuntime {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            ..Default::default()
        }
    }

    /// Total number of engine calls of any kind.
    pub fn engine_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ImageOps for MockRuntime {
    async fn build_image(&self, spec: &BuildSpec) -> Result<BuildStream, ImageError> {
        self.record_call();
        self.builds.lock().push(spec.clone());

        match &self.behavior.build {
            BuildBehavior::Succeed(lines) => {
                let items: Vec<Result<BuildOutput, ImageError>> = lines
                    .iter()
                    .map(|l| Ok(BuildOutput::Log(l.clone())))
                    .collect();
                Ok(Box::pin(stream::iter(items)))
            }
            BuildBehavior::EngineError(message) => Ok(Box::pin(stream::iter(vec![
                Ok(BuildOutput::Log("Step 1/2 : RUN go build\n".to_string())),
                Ok(BuildOutput::Error(message.clone())),
            ]))),
            BuildBehavior::StreamFailure(message) => Ok(Box::pin(stream::iter(vec![
                Ok(BuildOutput::Log("Step 1/2 : RUN go build\n".to_string())),
                Err(ImageError::BuildFailed(message.clone())),
            ]))),
            BuildBehavior::Refuse(message) => Err(ImageError::Runtime(message.clone())),
            BuildBehavior::Hang => Ok(Box::pin(stream::pending::<
                Result<BuildOutput, ImageError>,
            >())),
        }
    }
}

#[async_trait]
impl ContainerOps for MockRuntime {
    async fn create_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<ContainerId, ContainerError> {
        self.record_call();
        self.creates.lock().push(config.clone());

        if self.behavior.create_fails {
            return Err(ContainerError::ImageNotFound(config.image.clone()));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(ContainerId::new(format!("{:064x}", n + 1)))
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.record_call();
        if self.behavior.start_fails {
            return Err(ContainerError::Runtime("port is already allocated".to_string()));
        }
        self.started.lock().push(id.clone());
        Ok(())
    }

    async fn wait_container(&self, _id: &ContainerId) -> Result<i64, ContainerError> {
        self.record_call();
        match &self.behavior.wait {
            WaitBehavior::Running => futures::future::pending().await,
            WaitBehavior::Exited(code) => Ok(*code),
            WaitBehavior::Fails(message) => Err(ContainerError::Runtime(message.clone())),
        }
    }

    async fn stop_container(
        &self,
        id: &ContainerId,
        _timeout: Duration,
    ) -> Result<(), ContainerError> {
        self.record_call();
        self.stopped.lock().push(id.clone());
        Ok(())
    }

    async fn remove_container(&self, id: &ContainerId, _force: bool) -> Result<(), ContainerError> {
        self.record_call();
        self.removed.lock().push(id.clone());
        Ok(())
    }
}

#[async_trait]
impl LogOps for MockRuntime {
    async fn container_logs(
        &self,
        id: &ContainerId,
        _opts: &LogOptions,
    ) -> Result<LogStream, LogError> {
        self.record_call();
        self.log_requests.lock().push(id.clone());

        let lines: Vec<Result<LogLine, LogError>> = self
            .behavior
            .container_output
            .iter()
            .map(|l| {
                Ok(LogLine {
                    data: Bytes::from(l.clone()),
                    stream: LogStreamKind::Stdout,
                })
            })
            .collect();
        if self.behavior.output_stays_open {
            Ok(Box::pin(stream::iter(lines).chain(stream::pending())))
        } else {
            Ok(Box::pin(stream::iter(lines)))
        }
    }
}

/// Config writing logs under `logs_dir`, otherwise defaults.
pub fn test_config(logs_dir: &Path) -> Config {
    Config {
        logs_dir: logs_dir.to_path_buf(),
        ..Config::default()
    }
}

/// Orchestrator over `runtime` probing ports on loopback.
pub fn orchestrator(runtime: Arc<MockRuntime>, config: Config) -> Arc<Orchestrator<MockRuntime>> {
    Arc::new(
        Orchestrator::new(runtime, config)
            .with_ports(PortAllocator::new(IpAddr::V4(Ipv4Addr::LOCALHOST))),
    )
}
