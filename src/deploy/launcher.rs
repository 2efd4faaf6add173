// ABOUTME: Launch stage: host port, container configuration, create and start.
// ABOUTME: Moves a deployment from ImageBuilt to ContainerStarted.

use std::time::Duration;

use tracing::{info, warn};

use crate::config::{ContainerDefaults, LimitsConfig};
use crate::runtime::{ContainerConfig, ContainerOps, PortMapping};

use super::Deployment;
use super::error::{ContainerErrorExt, DeployError, with_deadline};
use super::mounts::mount_specs;
use super::port::PortAllocator;
use super::resources::resource_limits;
use super::state::{ContainerStarted, ImageBuilt};

impl Deployment<ImageBuilt> {
    /// Engine configuration for the container, publishing `host_port`.
    pub fn container_config(
        &self,
        host_port: u16,
        defaults: &ContainerDefaults,
        limits: &LimitsConfig,
    ) -> ContainerConfig {
        let container_port = match self.container_port {
            Some(port) => format!("{}/tcp", port),
            None => defaults.default_port.clone(),
        };

        ContainerConfig {
            image: self.image_name.to_string(),
            ports: vec![PortMapping {
                container_port,
                host_port,
                host_ip: None,
            }],
            resources: resource_limits(&self.request, limits),
            mounts: mount_specs(self.request.mounts.as_deref()),
            network_mode: Some(defaults.network_mode.clone()),
        }
    }

    /// Reserve a host port, then create and start the container.
    ///
    /// The port is released again if the container never starts.
    ///
    /// # Errors
    ///
    /// `PortAllocation`, `ContainerCreateFailed`, `ContainerStartFailed`,
    /// or `Timeout` when an engine call outlives `deadline`.
    pub async fn launch<R: ContainerOps + ?Sized>(
        self,
        runtime: &R,
        ports: &PortAllocator,
        defaults: &ContainerDefaults,
        limits: &LimitsConfig,
        deadline: Duration,
    ) -> Result<Deployment<ContainerStarted>, DeployError> {
        let host_port = ports
            .allocate()
            .await
            .map_err(|e| DeployError::PortAllocation(e.to_string()))?;

        let config = self.container_config(host_port, defaults, limits);

        let created = with_deadline("container create", deadline, async {
            runtime
                .create_container(&config)
                .await
                .map_err(ContainerErrorExt::into_create_error)
        })
        .await;
        let container_id = match created {
            Ok(id) => id,
            Err(e) => {
                ports.release(host_port);
                return Err(e);
            }
        };

        let started = with_deadline("container start", deadline, async {
            runtime
                .start_container(&container_id)
                .await
                .map_err(ContainerErrorExt::into_start_error)
        })
        .await;
        if let Err(e) = started {
            warn!(
                image = %self.image_name,
                container = %container_id.short(),
                "container created but did not start"
            );
            ports.release(host_port);
            return Err(e);
        }

        info!(
            image = %self.image_name,
            container = %container_id.short(),
            host_port,
            "container started"
        );

        Ok(self.transition(ContainerStarted {
            container_id,
            host_port,
        }))
    }
}
