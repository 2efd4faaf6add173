// ABOUTME: Composable capability traits for container runtimes.
// ABOUTME: Defines ImageOps, ContainerOps, LogOps and the FullRuntime umbrella.

mod container;
mod image;
mod logs;
mod shared_types;

pub use container::{ContainerError, ContainerOps};
pub use image::{BuildOutput, BuildStream, ImageError, ImageOps};
pub use logs::{LogError, LogLine, LogOps, LogOptions, LogStream, LogStreamKind};
pub use shared_types::*;

/// Everything the deployment pipeline needs from an engine.
pub trait FullRuntime: ImageOps + ContainerOps + LogOps {}

impl<T: ImageOps + ContainerOps + LogOps> FullRuntime for T {}
