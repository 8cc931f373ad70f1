use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use super::dockerfile::{DockerfileTemplate, MANIFEST_FILE};
use super::engine::{ImageEngine, with_timeout};
use crate::config::{BuildPaths, BuildSection};
use crate::errors::BuildError;

/// A file part received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Final path component of the client-supplied name, or `None` if there is none.
    pub fn safe_file_name(&self) -> Option<&str> {
        let name = Path::new(self.file_name.trim()).file_name()?.to_str()?;
        (!name.is_empty() && name != "." && name != "..").then_some(name)
    }
}

/// One validated build request.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub project: Upload,
    pub requirements: Option<Upload>,
    pub base_image: String,
    pub entrypoint: String,
}

/// What a successful build produced.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub tags: Vec<String>,
    /// Archive location relative to the working directory
    pub archive: PathBuf,
}

/// Runs the persist → render → build → export sequence against one working directory.
///
/// Every step depends on the previous one succeeding. All requests share the
/// same Dockerfile, manifest and archive paths, so builds are serialized.
pub struct ImageBuilder {
    settings: BuildSection,
    paths: BuildPaths,
    engine: Arc<dyn ImageEngine>,
    build_lock: Mutex<()>,
}

impl ImageBuilder {
    pub fn new(
        work_dir: impl Into<PathBuf>,
        settings: BuildSection,
        engine: Arc<dyn ImageEngine>,
    ) -> Self {
        let paths = BuildPaths::new(work_dir, &settings);
        Self {
            settings,
            paths,
            engine,
            build_lock: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &BuildSection {
        &self.settings
    }

    pub async fn build(&self, request: BuildRequest) -> Result<BuildOutcome, BuildError> {
        let project_name = request
            .project
            .safe_file_name()
            .ok_or(BuildError::NoProjectFile)?
            .to_string();

        let _guard = self.build_lock.lock().await;
        tracing::info!(
            project = %project_name,
            base_image = %request.base_image,
            entrypoint = %request.entrypoint,
            "starting image build"
        );

        // 1. Project file
        create_dir(&self.paths.projects_dir).await?;
        let project_path = self.paths.projects_dir.join(&project_name);
        write_file(&project_path, &request.project.bytes).await?;
        tracing::debug!(path = %project_path.display(), "project file saved");

        // 2. Dependency manifest; without one the install step fails inside the engine
        match &request.requirements {
            Some(manifest) => {
                let manifest_path = self.paths.projects_dir.join(MANIFEST_FILE);
                write_file(&manifest_path, &manifest.bytes).await?;
                tracing::debug!(path = %manifest_path.display(), "requirements saved");
            }
            None => tracing::debug!("no requirements uploaded"),
        }

        // 3. Build instructions
        let template = DockerfileTemplate {
            base_image: &request.base_image,
            projects_dir: &self.settings.projects_dir,
            entrypoint: &request.entrypoint,
        };
        write_file(&self.paths.dockerfile, template.render().as_bytes()).await?;
        tracing::debug!(path = %self.paths.dockerfile.display(), "Dockerfile written");

        // 4. Build
        let image = self.settings.image_name.as_str();
        let limit = self.settings.timeout();
        with_timeout(
            "image build",
            limit,
            self.engine
                .build(&self.paths.work_dir, &self.paths.dockerfile, image),
        )
        .await?;
        let tags = with_timeout("image inspect", limit, self.engine.tags(image)).await?;
        tracing::info!(?tags, "image built");

        // 5. Export
        create_dir(&self.paths.images_dir).await?;
        let archive_name = self.settings.archive_name();
        let archive_path = self.paths.images_dir.join(&archive_name);
        // An archive left by an earlier build must not pass for this one
        remove_stale(&archive_path).await?;
        with_timeout("image export", limit, self.engine.save(image, &archive_path)).await?;
        if tokio::fs::metadata(&archive_path).await.is_err() {
            return Err(BuildError::ArchiveMissing { path: archive_path });
        }
        tracing::info!(path = %archive_path.display(), "image saved");

        // 6. Report
        Ok(BuildOutcome {
            tags,
            archive: Path::new(&self.settings.images_dir).join(archive_name),
        })
    }
}

async fn create_dir(path: &Path) -> Result<(), BuildError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| BuildError::Io {
            path: path.to_path_buf(),
            source,
        })
}

async fn remove_stale(path: &Path) -> Result<(), BuildError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed previous archive");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(BuildError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), BuildError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| BuildError::Io {
            path: path.to_path_buf(),
            source,
        })
}
