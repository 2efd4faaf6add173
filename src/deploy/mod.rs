// ABOUTME: Deployment pipeline using the type state pattern.
// ABOUTME: Validate, build image, launch container, monitor; one response per run.

mod builder;
mod context;
mod deployment;
mod error;
mod executable;
mod launcher;
mod logfile;
mod monitor;
mod mounts;
mod orchestrator;
mod port;
mod request;
mod resources;
mod state;

pub use builder::{
    ARG_BRANCH, ARG_BUILD_CMD, ARG_EXEC_NAME, ARG_GIT_URL, ARG_PORT, ARG_START_CMD,
};
pub use context::{BuildContext, DEFAULT_DOCKERFILE};
pub use deployment::Deployment;
pub use error::{ContainerErrorExt, DeployError, DeployErrorKind};
pub use executable::extract_executable_name;
pub use logfile::{LogDir, TIMESTAMP_FORMAT};
pub use monitor::TransitionResult;
pub use mounts::mount_specs;
pub use orchestrator::Orchestrator;
pub use port::{PortAllocator, PortError};
pub use request::{DeployRequest, DeploymentInfo, DockerResponse, Mount};
pub use resources::resource_limits;
pub use state::{Completed, ContainerStarted, ImageBuilt, Validated};
