// ABOUTME: Container defaults used when a deploy request leaves them out.
// ABOUTME: Internal port, network mode, and the built executable's name.

use serde::Deserialize;

pub const DEFAULT_CONTAINER_PORT: &str = "8080/tcp";
pub const DEFAULT_NETWORK_MODE: &str = "bridge";
pub const DEFAULT_EXECUTABLE_NAME: &str = "app";

#[derive(Debug, Clone, Deserialize)]
pub struct ContainerDefaults {
    /// Container-internal port with protocol, used when a request has no port.
    #[serde(default = "default_port")]
    pub default_port: String,

    #[serde(default = "default_network_mode")]
    pub network_mode: String,

    /// Executable name used when the build command has no `-o` flag.
    #[serde(default = "default_executable")]
    pub default_executable: String,
}

fn default_port() -> String {
    DEFAULT_CONTAINER_PORT.to_string()
}

fn default_network_mode() -> String {
    DEFAULT_NETWORK_MODE.to_string()
}

fn default_executable() -> String {
    DEFAULT_EXECUTABLE_NAME.to_string()
}

impl ContainerDefaults {
    /// The numeric part of the default port, e.g. `8080` for `8080/tcp`.
    pub fn default_port_number(&self) -> &str {
        self.default_port
            .split_once('/')
            .map(|(port, _)| port)
            .unwrap_or(&self.default_port)
    }
}

impl Default for ContainerDefaults {
    fn default() -> Self {
        ContainerDefaults {
            default_port: default_port(),
            network_mode: default_network_mode(),
            default_executable: default_executable(),
        }
    }
}
