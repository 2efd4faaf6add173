// ABOUTME: Generic deployment struct parameterized by state marker.
// ABOUTME: Validation is the only way in; info() only exists once a container started.

use crate::config::LimitsConfig;
use crate::types::ImageName;

use super::error::DeployError;
use super::request::{DeployRequest, DeploymentInfo};
use super::state::{Completed, ContainerStarted, Validated};

/// One deploy run, parameterized by how far it has got.
///
/// The state type parameter `S` carries state-specific data (container ID,
/// host port) directly, so a `DeploymentInfo` can only be produced once a
/// container has been created and started.
#[derive(Debug)]
pub struct Deployment<S> {
    pub(crate) request: DeployRequest,
    pub(crate) repository_url: String,
    /// Requested container port, parsed.
    pub(crate) container_port: Option<u16>,
    pub(crate) image_name: ImageName,
    pub(crate) state: S,
}

impl Deployment<Validated> {
    /// Check `request` against `limits` and name the image.
    ///
    /// The first violation wins. Nothing touches the engine before this succeeds.
    pub fn validate(request: DeployRequest, limits: &LimitsConfig) -> Result<Self, DeployError> {
        let repository_url = match request.repository_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => return Err(DeployError::MissingRepositoryUrl),
        };

        if let Some(memory) = request.memory_limit
            && memory < limits.min_memory
        {
            return Err(DeployError::MemoryBelowMinimum {
                requested: memory,
                minimum: limits.min_memory,
            });
        }

        if let Some(cpus) = request.cpus
            && (cpus.is_nan() || cpus < limits.min_cpus)
        {
            return Err(DeployError::CpusBelowMinimum {
                requested: cpus,
                minimum: limits.min_cpus,
            });
        }

        let container_port = match request.port.as_deref() {
            Some(port) => match parse_port(port) {
                Some(p) => Some(p),
                None => return Err(DeployError::InvalidPort(port.to_string())),
            },
            None => None,
        };

        Ok(Deployment {
            request,
            repository_url,
            container_port,
            image_name: ImageName::generate(),
            state: Validated,
        })
    }
}

/// Plain decimal digits naming a non-zero TCP port. Signs are rejected.
fn parse_port(port: &str) -> Option<u16> {
    let digits = port.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u16>().ok().filter(|p| *p != 0)
}

impl<S> Deployment<S> {
    /// Internal helper to move to the next state.
    pub(crate) fn transition<T>(self, state: T) -> Deployment<T> {
        Deployment {
            request: self.request,
            repository_url: self.repository_url,
            container_port: self.container_port,
            image_name: self.image_name,
            state,
        }
    }

    pub fn image_name(&self) -> &ImageName {
        &self.image_name
    }

    pub fn request(&self) -> &DeployRequest {
        &self.request
    }

    pub fn repository_url(&self) -> &str {
        &self.repository_url
    }

    /// Container port from the request, if it named one.
    pub fn container_port(&self) -> Option<u16> {
        self.container_port
    }

    pub fn state(&self) -> &S {
        &self.state
    }
}

impl Deployment<ContainerStarted> {
    /// Handle for the caller: image name and published host port.
    pub fn info(&self) -> DeploymentInfo {
        DeploymentInfo {
            image_name: self.image_name.to_string(),
            port: self.state.host_port.to_string(),
        }
    }
}

impl Deployment<Completed> {
    /// Handle for the caller: image name and published host port.
    pub fn info(&self) -> DeploymentInfo {
        DeploymentInfo {
            image_name: self.image_name.to_string(),
            port: self.state.host_port.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::error::DeployErrorKind;

    fn request() -> DeployRequest {
        DeployRequest {
            repository_url: Some("https://example.com/r.git".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_minimal_request() {
        let deployment = Deployment::<Validated>::validate(request(), &LimitsConfig::default()).unwrap();
        assert_eq!(deployment.repository_url(), "https://example.com/r.git");
        assert!(!deployment.image_name().as_str().is_empty());
    }

    #[test]
    fn rejects_missing_repository() {
        let err = Deployment::<Validated>::validate(DeployRequest::default(), &LimitsConfig::default())
            .unwrap_err();
        assert!(matches!(err, DeployError::MissingRepositoryUrl));
    }

    #[test]
    fn rejects_blank_repository() {
        let req = DeployRequest {
            repository_url: Some("  ".to_string()),
            ..Default::default()
        };
        let err = Deployment::<Validated>::validate(req, &LimitsConfig::default()).unwrap_err();
        assert!(matches!(err, DeployError::MissingRepositoryUrl));
    }

    #[test]
    fn rejects_memory_below_floor() {
        let req = DeployRequest {
            memory_limit: Some(1000),
            ..request()
        };
        let err = Deployment::<Validated>::validate(req, &LimitsConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            DeployError::MemoryBelowMinimum {
                requested: 1000,
                minimum: 6_291_000
            }
        ));
    }

    #[test]
    fn accepts_memory_at_floor() {
        let req = DeployRequest {
            memory_limit: Some(6_291_000),
            ..request()
        };
        assert!(Deployment::<Validated>::validate(req, &LimitsConfig::default()).is_ok());
    }

    #[test]
    fn rejects_cpus_below_floor() {
        let req = DeployRequest {
            cpus: Some(0.001),
            ..request()
        };
        let err = Deployment::<Validated>::validate(req, &LimitsConfig::default()).unwrap_err();
        assert!(matches!(err, DeployError::CpusBelowMinimum { .. }));
        assert_eq!(err.kind(), DeployErrorKind::Validation);
    }

    #[test]
    fn missing_repository_reported_before_limits() {
        let req = DeployRequest {
            memory_limit: Some(1),
            cpus: Some(0.0),
            ..Default::default()
        };
        let err = Deployment::<Validated>::validate(req, &LimitsConfig::default()).unwrap_err();
        assert!(matches!(err, DeployError::MissingRepositoryUrl));
    }

    #[test]
    fn rejects_bad_ports() {
        for port in ["0", "70000", "http", "", "+9090", "-1", "90 90"] {
            let req = DeployRequest {
                port: Some(port.to_string()),
                ..request()
            };
            let err = Deployment::<Validated>::validate(req, &LimitsConfig::default()).unwrap_err();
            assert!(matches!(err, DeployError::InvalidPort(_)), "port {port:?}");
        }
    }

    #[test]
    fn port_is_carried_as_a_number() {
        for (raw, expected) in [("9090", 9090), (" 3000 ", 3000), ("09090", 9090)] {
            let req = DeployRequest {
                port: Some(raw.to_string()),
                ..request()
            };
            let deployment =
                Deployment::<Validated>::validate(req, &LimitsConfig::default()).unwrap();
            assert_eq!(deployment.container_port(), Some(expected), "port {raw:?}");
        }
    }

    #[test]
    fn each_run_gets_a_fresh_image_name() {
        let a = Deployment::<Validated>::validate(request(), &LimitsConfig::default()).unwrap();
        let b = Deployment::<Validated>::validate(request(), &LimitsConfig::default()).unwrap();
        assert_ne!(a.image_name(), b.image_name());
    }
}
