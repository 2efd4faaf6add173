// ABOUTME: Configuration types and parsing for ascend.yml.
// ABOUTME: Every field has a default so the service runs without a file.

mod container;
mod limits;
mod timeouts;

pub use container::{
    ContainerDefaults, DEFAULT_CONTAINER_PORT, DEFAULT_EXECUTABLE_NAME, DEFAULT_NETWORK_MODE,
};
pub use limits::{DEFAULT_MEMORY_LIMIT, LimitsConfig, MIN_CPUS, MIN_MEMORY_LIMIT};
pub use timeouts::TimeoutsConfig;

use crate::error::{Error, Result};
use crate::runtime::{RuntimeConfig, RuntimeType};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "ascend.yml";
pub const CONFIG_FILENAME_ALT: &str = "ascend.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".ascend/config.yml";

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8000";
pub const DEFAULT_LOGS_DIR: &str = "./logs";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,

    /// Directory holding the Dockerfile. `None` uses the built-in template.
    #[serde(default)]
    pub build_context: Option<PathBuf>,

    #[serde(default)]
    pub runtime: Option<RuntimeType>,

    #[serde(default)]
    pub socket: Option<String>,

    #[serde(default)]
    pub container: ContainerDefaults,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub timeouts: TimeoutsConfig,

    /// Stop and remove a started container when monitoring it fails.
    #[serde(default)]
    pub cleanup_on_failure: bool,
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOGS_DIR)
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen: default_listen(),
            logs_dir: default_logs_dir(),
            build_context: None,
            runtime: None,
            socket: None,
            container: ContainerDefaults::default(),
            limits: LimitsConfig::default(),
            timeouts: TimeoutsConfig::default(),
            cleanup_on_failure: false,
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Like `discover`, but a missing file means defaults.
    pub fn discover_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Engine selection for `runtime::connect`.
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            runtime: self.runtime,
            socket: self.socket.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.limits.min_memory < 0 {
            return Err(Error::InvalidConfig(
                "limits.min_memory cannot be negative".to_string(),
            ));
        }
        if self.limits.default_memory < self.limits.min_memory {
            return Err(Error::InvalidConfig(format!(
                "limits.default_memory ({}) is below limits.min_memory ({})",
                self.limits.default_memory, self.limits.min_memory
            )));
        }
        if !self.limits.min_cpus.is_finite() || self.limits.min_cpus < 0.0 {
            return Err(Error::InvalidConfig(
                "limits.min_cpus must be a non-negative number".to_string(),
            ));
        }
        if !self.container.default_port.contains('/') {
            return Err(Error::InvalidConfig(format!(
                "container.default_port must look like 8080/tcp, got {}",
                self.container.default_port
            )));
        }
        Ok(())
    }
}
