// ABOUTME: Shared types used across runtime trait definitions.
// ABOUTME: ContainerConfig, PortMapping, ResourceLimits, MountSpec, BuildSpec.

use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;

/// Configuration for creating a container.
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// Image to run.
    pub image: String,
    /// Port mappings (host:container).
    pub ports: Vec<PortMapping>,
    /// Resource limits.
    pub resources: ResourceLimits,
    /// Mounts, in declaration order.
    pub mounts: Vec<MountSpec>,
    /// Network mode (e.g. "bridge").
    pub network_mode: Option<String>,
}

/// Port mapping configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapping {
    /// Container port with protocol, e.g. `8080/tcp`.
    pub container_port: String,
    /// Host port.
    pub host_port: u16,
    /// Host IP to bind to. `None` binds every interface.
    pub host_ip: Option<String>,
}

/// Resource limits in engine units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResourceLimits {
    /// Memory limit in bytes.
    pub memory: Option<i64>,
    /// CPU quota in units of 1e-9 CPUs.
    pub nano_cpus: Option<i64>,
}

/// Kind of a mount, as the engine understands it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MountKind {
    #[default]
    Bind,
    Volume,
    Cluster,
    NamedPipe,
    Tmpfs,
}

impl MountKind {
    pub const ALL: [MountKind; 5] = [
        MountKind::Bind,
        MountKind::Volume,
        MountKind::Cluster,
        MountKind::NamedPipe,
        MountKind::Tmpfs,
    ];

    /// Parse a caller-supplied kind, case-insensitively. Anything unknown is a bind.
    pub fn parse(kind: &str) -> Self {
        match kind.to_ascii_lowercase().as_str() {
            "bind" => MountKind::Bind,
            "volume" => MountKind::Volume,
            "cluster" => MountKind::Cluster,
            "namedpipe" | "npipe" | "named-pipe" => MountKind::NamedPipe,
            "tmpfs" => MountKind::Tmpfs,
            _ => MountKind::Bind,
        }
    }
}

impl fmt::Display for MountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MountKind::Bind => "bind",
            MountKind::Volume => "volume",
            MountKind::Cluster => "cluster",
            MountKind::NamedPipe => "npipe",
            MountKind::Tmpfs => "tmpfs",
        };
        write!(f, "{s}")
    }
}

/// Mount configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountSpec {
    /// Source path or volume name.
    pub source: String,
    /// Target path in container.
    pub target: String,
    /// Mount kind.
    pub kind: MountKind,
}

/// Everything needed to submit one image build.
#[derive(Debug, Clone)]
pub struct BuildSpec {
    /// Tag for the resulting image.
    pub tag: String,
    /// Tar archive of the build context.
    pub context: Bytes,
    /// Build-time variables.
    pub build_args: HashMap<String, String>,
    /// Disable the layer cache.
    pub no_cache: bool,
    /// Remove intermediate containers after a successful build.
    pub remove_intermediate: bool,
}
