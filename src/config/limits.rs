// ABOUTME: Resource limit defaults and floors for deployed containers.
// ABOUTME: Requests below the floors are rejected before any engine call.

use serde::Deserialize;

/// Memory ceiling applied when a request does not set one (bytes).
pub const DEFAULT_MEMORY_LIMIT: i64 = 2_147_000_000;
/// Smallest memory limit a request may ask for (bytes).
pub const MIN_MEMORY_LIMIT: i64 = 6_291_000;
/// Smallest CPU share a request may ask for.
pub const MIN_CPUS: f64 = 0.01;

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_memory")]
    pub default_memory: i64,

    #[serde(default = "default_min_memory")]
    pub min_memory: i64,

    #[serde(default = "default_min_cpus")]
    pub min_cpus: f64,
}

fn default_memory() -> i64 {
    DEFAULT_MEMORY_LIMIT
}

fn default_min_memory() -> i64 {
    MIN_MEMORY_LIMIT
}

fn default_min_cpus() -> f64 {
    MIN_CPUS
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            default_memory: default_memory(),
            min_memory: default_min_memory(),
            min_cpus: default_min_cpus(),
        }
    }
}
