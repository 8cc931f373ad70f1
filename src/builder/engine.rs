use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use bollard::Docker;
use tokio::process::Command;

use crate::errors::BuildError;

/// Keep error payloads readable: engine stderr can run to thousands of lines.
const STDERR_TAIL_LINES: usize = 20;

/// Abstraction over the container engine for testability.
/// Real implementation: `DockerEngine`. Test double: `FakeEngine` in the pipeline tests.
#[async_trait]
pub trait ImageEngine: Send + Sync {
    /// Build `context` with the instructions at `dockerfile`, tagging the result as `image`.
    async fn build(&self, context: &Path, dockerfile: &Path, image: &str) -> Result<(), BuildError>;

    /// Tags the engine currently associates with `image`.
    async fn tags(&self, image: &str) -> Result<Vec<String>, BuildError>;

    /// Export `image` as a tar archive at `output`.
    async fn save(&self, image: &str, output: &Path) -> Result<(), BuildError>;

    /// Cheap reachability probe.
    async fn ping(&self) -> Result<(), BuildError>;
}

/// Drives the Docker CLI for build/save and the Engine API (via bollard) for inspection.
pub struct DockerEngine {
    program: String,
    docker: Docker,
}

impl DockerEngine {
    /// Connect using `DOCKER_HOST` or the platform's default socket.
    pub fn connect(program: impl Into<String>) -> Result<Self, BuildError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| BuildError::Engine(format!("Failed to connect to Docker: {}", e)))?;
        Ok(Self {
            program: program.into(),
            docker,
        })
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::Output, BuildError> {
        tracing::debug!(program = %self.program, ?args, "spawning container engine");
        Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| BuildError::Spawn {
                program: self.program.clone(),
                source,
            })
    }
}

#[async_trait]
impl ImageEngine for DockerEngine {
    async fn build(
        &self,
        context: &Path,
        dockerfile: &Path,
        image: &str,
    ) -> Result<(), BuildError> {
        let context = context.to_string_lossy();
        let dockerfile = dockerfile.to_string_lossy();
        let output = self
            .run(&["build", "-f", &dockerfile, "-t", image, &context])
            .await?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            tracing::debug!(target: "dockyard::engine", "{}", line);
        }

        if !output.status.success() {
            return Err(BuildError::BuildFailed {
                code: output.status.code(),
                stderr: stderr_tail(&output.stderr),
            });
        }
        Ok(())
    }

    async fn tags(&self, image: &str) -> Result<Vec<String>, BuildError> {
        let inspect = self
            .docker
            .inspect_image(image)
            .await
            .map_err(BuildError::Inspect)?;
        Ok(inspect.repo_tags.unwrap_or_default())
    }

    async fn save(&self, image: &str, output: &Path) -> Result<(), BuildError> {
        let output_path = output.to_string_lossy();
        let result = self.run(&["save", "-o", &output_path, image]).await?;

        if !result.status.success() {
            return Err(BuildError::ExportFailed {
                code: result.status.code(),
                stderr: stderr_tail(&result.stderr),
            });
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), BuildError> {
        self.docker
            .ping()
            .await
            .map(|_| ())
            .map_err(|e| BuildError::Engine(format!("Docker is not reachable: {}", e)))
    }
}

/// Last few lines of a process's stderr, trimmed.
pub fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.trim().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Run an engine step under an optional deadline.
pub async fn with_timeout<T>(
    step: &'static str,
    limit: Option<Duration>,
    fut: impl std::future::Future<Output = Result<T, BuildError>>,
) -> Result<T, BuildError> {
    match limit {
        None => fut.await,
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| BuildError::TimedOut {
                step,
                secs: limit.as_secs(),
            })?,
    }
}
