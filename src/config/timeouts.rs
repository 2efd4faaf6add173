// ABOUTME: Deadlines for container engine calls.
// ABOUTME: Keeps a hung engine from holding a deploy request forever.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutsConfig {
    /// Whole image build, including draining the build log.
    #[serde(default = "default_build", with = "humantime_serde")]
    pub build: Duration,

    /// Each create, start, stop, or remove call.
    #[serde(default = "default_engine", with = "humantime_serde")]
    pub engine: Duration,

    /// How long to wait for an early exit after start. Zero polls once.
    #[serde(default, with = "humantime_serde")]
    pub exit_grace: Duration,
}

fn default_build() -> Duration {
    Duration::from_secs(30 * 60)
}

fn default_engine() -> Duration {
    Duration::from_secs(120)
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        TimeoutsConfig {
            build: default_build(),
            engine: default_engine(),
            exit_grace: Duration::ZERO,
        }
    }
}
