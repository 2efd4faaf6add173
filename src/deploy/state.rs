// ABOUTME: Deployment state marker types for the type state pattern.
// ABOUTME: Later states carry the engine resources that exist at that point.

use crate::types::ContainerId;

/// Request checked, image name chosen.
/// Available actions: `build_image()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Validated;

/// Image built and tagged.
/// Available actions: `launch()`
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageBuilt;

/// Container created and started, host port bound.
/// Available actions: `monitor()`, `cleanup()`, `info()`
#[derive(Debug, Clone)]
pub struct ContainerStarted {
    pub(crate) container_id: ContainerId,
    pub(crate) host_port: u16,
}

impl ContainerStarted {
    pub fn container_id(&self) -> &ContainerId {
        &self.container_id
    }

    pub fn host_port(&self) -> u16 {
        self.host_port
    }
}

/// Monitoring decided: the container is running or has already exited.
/// Available actions: `info()`
#[derive(Debug, Clone)]
pub struct Completed {
    pub(crate) container_id: ContainerId,
    pub(crate) host_port: u16,
    pub(crate) exit_code: Option<i64>,
}

impl Completed {
    pub fn container_id(&self) -> &ContainerId {
        &self.container_id
    }

    pub fn host_port(&self) -> u16 {
        self.host_port
    }

    /// Exit code if the container had already stopped when monitored.
    pub fn exit_code(&self) -> Option<i64> {
        self.exit_code
    }
}
