// ABOUTME: Runs one deploy end to end and reduces it to a single DockerResponse.
// ABOUTME: Owns the engine handle, build context, logs directory, and port reservations.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{Instrument, info, info_span, warn};

use crate::config::Config;
use crate::runtime::FullRuntime;

use super::Deployment;
use super::context::BuildContext;
use super::error::DeployError;
use super::logfile::LogDir;
use super::port::PortAllocator;
use super::request::{DeployRequest, DockerResponse};
use super::state::{Completed, Validated};

/// Grace period given to a container being stopped after a failed deploy.
const CLEANUP_STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// Drives deployments through validate, build, launch, and monitor.
pub struct Orchestrator<R: ?Sized> {
    config: Config,
    context: BuildContext,
    logs: LogDir,
    ports: Arc<PortAllocator>,
    runtime: Arc<R>,
}

impl<R: FullRuntime + ?Sized + 'static> Orchestrator<R> {
    pub fn new(runtime: Arc<R>, config: Config) -> Self {
        Self {
            context: BuildContext::from_config(config.build_context.as_ref()),
            logs: LogDir::new(&config.logs_dir),
            ports: Arc::new(PortAllocator::default()),
            config,
            runtime,
        }
    }

    /// Replace the port allocator, e.g. to bind probes to loopback.
    pub fn with_ports(mut self, ports: PortAllocator) -> Self {
        self.ports = Arc::new(ports);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ports(&self) -> &PortAllocator {
        &self.ports
    }

    pub fn logs(&self) -> &LogDir {
        &self.logs
    }

    /// Run one deploy to completion. Never panics on engine failure: every
    /// outcome is a `DockerResponse`.
    pub async fn run(&self, request: DeployRequest) -> DockerResponse {
        match self.execute(request).await {
            Ok(deployment) => {
                let info = deployment.info();
                info!(
                    image = %info.image_name,
                    container = %deployment.state().container_id().short(),
                    port = %info.port,
                    exited = deployment.state().exit_code().is_some(),
                    "deploy finished"
                );
                DockerResponse::Info(info)
            }
            Err(e) => {
                if e.is_validation() {
                    info!("deploy rejected: {}", e);
                } else {
                    warn!(kind = ?e.kind(), "deploy failed: {}", e);
                }
                DockerResponse::Error(e.to_string())
            }
        }
    }

    /// Start a deploy on its own task. The receiver yields exactly one response.
    pub fn dispatch(self: &Arc<Self>, request: DeployRequest) -> oneshot::Receiver<DockerResponse> {
        let (tx, rx) = oneshot::channel();
        let this = Arc::clone(self);
        let span = info_span!("deploy", repository = request.repository_url.as_deref().unwrap_or(""));

        tokio::spawn(
            async move {
                let response = this.run(request).await;
                if tx.send(response).is_err() {
                    info!("deploy caller went away before the result was ready");
                }
            }
            .instrument(span),
        );

        rx
    }

    async fn execute(&self, request: DeployRequest) -> Result<Deployment<Completed>, DeployError> {
        let runtime = &*self.runtime;
        let defaults = &self.config.container;
        let limits = &self.config.limits;
        let timeouts = &self.config.timeouts;

        let deployment = Deployment::<Validated>::validate(request, limits)?;
        info!(
            image = %deployment.image_name(),
            repository = %deployment.repository_url(),
            "deploy accepted"
        );

        let deployment = deployment
            .build_image(runtime, &self.context, &self.logs, defaults, timeouts.build)
            .await?;

        let deployment = deployment
            .launch(runtime, self.ports(), defaults, limits, timeouts.engine)
            .await?;

        match deployment
            .monitor(
                runtime,
                &self.logs,
                &self.ports,
                timeouts.exit_grace,
                timeouts.engine,
            )
            .await
        {
            Ok(completed) => Ok(completed),
            Err((started, err)) => {
                warn!(
                    container = %started.state().container_id().short(),
                    cleanup = self.config.cleanup_on_failure,
                    "started container failed"
                );
                if self.config.cleanup_on_failure {
                    started
                        .cleanup(runtime, self.ports(), CLEANUP_STOP_TIMEOUT, timeouts.engine)
                        .await;
                }
                Err(err)
            }
        }
    }
}
