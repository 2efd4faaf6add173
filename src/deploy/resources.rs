// ABOUTME: Translates requested memory/CPU into engine resource limits.
// ABOUTME: Memory falls back to a default ceiling; CPU is unconstrained if unset.

use crate::config::LimitsConfig;
use crate::runtime::ResourceLimits;

use super::request::DeployRequest;

const NANO_CPUS_PER_CPU: f64 = 1_000_000_000.0;

/// Engine limits for `request`. Floors are checked during validation, not here.
pub fn resource_limits(request: &DeployRequest, limits: &LimitsConfig) -> ResourceLimits {
    ResourceLimits {
        memory: Some(request.memory_limit.unwrap_or(limits.default_memory)),
        nano_cpus: request.cpus.map(|cpus| (cpus * NANO_CPUS_PER_CPU) as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MEMORY_LIMIT;

    #[test]
    fn defaults_when_unset() {
        let limits = resource_limits(&DeployRequest::default(), &LimitsConfig::default());
        assert_eq!(limits.memory, Some(DEFAULT_MEMORY_LIMIT));
        assert_eq!(limits.nano_cpus, None);
    }

    #[test]
    fn uses_requested_values() {
        let request = DeployRequest {
            memory_limit: Some(64 * 1024 * 1024),
            cpus: Some(1.5),
            ..Default::default()
        };
        let limits = resource_limits(&request, &LimitsConfig::default());
        assert_eq!(limits.memory, Some(64 * 1024 * 1024));
        assert_eq!(limits.nano_cpus, Some(1_500_000_000));
    }

    #[test]
    fn fractional_cpus_scale_to_nanocpus() {
        let request = DeployRequest {
            cpus: Some(0.25),
            ..Default::default()
        };
        let limits = resource_limits(&request, &LimitsConfig::default());
        assert_eq!(limits.nano_cpus, Some(250_000_000));
    }
}
