// ABOUTME: Image build stage: templated build args, engine build, build log.
// ABOUTME: Moves a deployment from Validated to ImageBuilt.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::ContainerDefaults;
use crate::runtime::{BuildOutput, BuildSpec, ImageOps};

use super::Deployment;
use super::context::BuildContext;
use super::error::{DeployError, with_deadline};
use super::executable::extract_executable_name;
use super::logfile::LogDir;
use super::state::{ImageBuilt, Validated};

pub const ARG_GIT_URL: &str = "GIT_URL";
pub const ARG_BRANCH: &str = "BRANCH";
pub const ARG_PORT: &str = "PORT";
pub const ARG_BUILD_CMD: &str = "BUILD_CMD";
pub const ARG_START_CMD: &str = "START_CMD";
pub const ARG_EXEC_NAME: &str = "EXEC_NAME";

impl Deployment<Validated> {
    /// Build-time variables for this deployment's image.
    pub fn build_args(&self, defaults: &ContainerDefaults) -> HashMap<String, String> {
        let request = &self.request;
        let mut args = HashMap::new();

        args.insert(ARG_GIT_URL.to_string(), self.repository_url.clone());

        let port = match self.container_port {
            Some(port) => port.to_string(),
            None => defaults.default_port_number().to_string(),
        };
        args.insert(ARG_PORT.to_string(), port);

        if let Some(ref command) = request.build_command {
            args.insert(ARG_BUILD_CMD.to_string(), command.clone());
        }
        if let Some(ref command) = request.start_command {
            args.insert(ARG_START_CMD.to_string(), command.clone());
        }
        if !request.branch.is_empty() {
            args.insert(ARG_BRANCH.to_string(), request.branch.clone());
        }

        let executable = extract_executable_name(
            request.build_command.as_deref(),
            &defaults.default_executable,
        );
        args.insert(ARG_EXEC_NAME.to_string(), executable);

        args
    }

    /// Build and tag the image, writing the engine's build output to the logs directory.
    ///
    /// # Errors
    ///
    /// `BuildContext` if the context cannot be archived, `LogFile` if the
    /// build log cannot be created, `BuildFailed` if the engine fails or
    /// reports a build error, `Timeout` if the build outlives `deadline`.
    pub async fn build_image<R: ImageOps + ?Sized>(
        self,
        runtime: &R,
        context: &BuildContext,
        logs: &LogDir,
        defaults: &ContainerDefaults,
        deadline: Duration,
    ) -> Result<Deployment<ImageBuilt>, DeployError> {
        let archive = context
            .archive()
            .await
            .map_err(|e| DeployError::BuildContext(e.to_string()))?;

        let spec = BuildSpec {
            tag: self.image_name.to_string(),
            context: archive,
            build_args: self.build_args(defaults),
            no_cache: true,
            remove_intermediate: true,
        };

        let log_path = logs.build_log(&self.image_name);
        info!(
            image = %self.image_name,
            log = %log_path.display(),
            "image build started"
        );

        with_deadline(
            "image build",
            deadline,
            run_build(runtime, &spec, logs, &log_path),
        )
        .await?;

        info!(image = %self.image_name, "image build finished");
        Ok(self.transition(ImageBuilt))
    }
}

/// Submit the build and copy its output to `log_path` until the stream ends.
async fn run_build<R: ImageOps + ?Sized>(
    runtime: &R,
    spec: &BuildSpec,
    logs: &LogDir,
    log_path: &Path,
) -> Result<(), DeployError> {
    let mut stream = runtime.build_image(spec).await?;

    let file = logs
        .create(log_path)
        .await
        .map_err(|e| DeployError::LogFile(format!("{}: {}", log_path.display(), e)))?;
    let mut log = BuildLog {
        file: Some(file),
        path: log_path,
    };
    let mut failure: Option<String> = None;

    while let Some(item) = stream.next().await {
        match item {
            Ok(BuildOutput::Log(text)) => log.write(&text).await,
            Ok(BuildOutput::Error(message)) => {
                debug!(tag = %spec.tag, "engine reported build error: {}", message);
                log.write(&format!("{}\n", message)).await;
                failure.get_or_insert(message);
            }
            Err(e) => {
                log.write(&format!("{}\n", e)).await;
                log.finish().await;
                return Err(e.into());
            }
        }
    }

    log.finish().await;
    match failure {
        Some(message) => Err(DeployError::BuildFailed(message)),
        None => Ok(()),
    }
}

/// Build log sink. A failed write stops logging but never the build.
struct BuildLog<'a> {
    file: Option<tokio::fs::File>,
    path: &'a Path,
}

impl BuildLog<'_> {
    async fn write(&mut self, text: &str) {
        if let Some(file) = self.file.as_mut()
            && let Err(e) = file.write_all(text.as_bytes()).await
        {
            warn!(log = %self.path.display(), "build log write failed, discarding the rest: {}", e);
            self.file = None;
        }
    }

    async fn finish(&mut self) {
        if let Some(file) = self.file.as_mut()
            && let Err(e) = file.flush().await
        {
            warn!(log = %self.path.display(), "build log flush failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LimitsConfig;
    use crate::deploy::request::DeployRequest;

    fn validated(request: DeployRequest) -> Deployment<Validated> {
        Deployment::<Validated>::validate(request, &LimitsConfig::default()).unwrap()
    }

    #[test]
    fn build_args_carry_request_fields() {
        let deployment = validated(DeployRequest {
            repository_url: Some("https://example.com/r.git".to_string()),
            build_command: Some("go build -o myService .".to_string()),
            start_command: Some("./myService".to_string()),
            port: Some("9090".to_string()),
            branch: "main".to_string(),
            ..Default::default()
        });

        let args = deployment.build_args(&ContainerDefaults::default());
        assert_eq!(args[ARG_GIT_URL], "https://example.com/r.git");
        assert_eq!(args[ARG_BUILD_CMD], "go build -o myService .");
        assert_eq!(args[ARG_START_CMD], "./myService");
        assert_eq!(args[ARG_PORT], "9090");
        assert_eq!(args[ARG_BRANCH], "main");
        assert_eq!(args[ARG_EXEC_NAME], "myService");
    }

    #[test]
    fn build_port_is_normalised() {
        let deployment = validated(DeployRequest {
            repository_url: Some("https://example.com/r.git".to_string()),
            port: Some("08080".to_string()),
            ..Default::default()
        });

        let args = deployment.build_args(&ContainerDefaults::default());
        assert_eq!(args[ARG_PORT], "8080");
    }

    #[test]
    fn build_args_fall_back_to_defaults() {
        let deployment = validated(DeployRequest {
            repository_url: Some("https://example.com/r.git".to_string()),
            ..Default::default()
        });

        let args = deployment.build_args(&ContainerDefaults::default());
        assert_eq!(args[ARG_PORT], "8080");
        assert_eq!(args[ARG_EXEC_NAME], "app");
        assert!(!args.contains_key(ARG_BUILD_CMD));
        assert!(!args.contains_key(ARG_START_CMD));
        assert!(!args.contains_key(ARG_BRANCH));
    }
}
