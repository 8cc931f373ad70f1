//! Layered configuration for the dockyard server.
//!
//! Settings are resolved in this order, later layers winning:
//! 1. Built-in defaults
//! 2. `dockyard.toml` in the working directory (or `--config <path>`)
//! 3. Environment variables (`.env` is loaded first by the binary)
//! 4. CLI flags
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8000
//! dev = false
//! max_upload_mb = 512
//!
//! [build]
//! projects_dir = "projects"
//! images_dir = "images"
//! dockerfile = "Dockerfile"
//! image_name = "my_image"
//! docker_cmd = "docker"
//! default_base_image = "python:3.8"
//! default_entrypoint = "app.py"
//! timeout_secs = 0
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! dir = "logs"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = "dockyard.toml";

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Permissive CORS for a front-end served from another origin
    #[serde(default)]
    pub dev: bool,
    /// Upper bound for a whole multipart request body
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_upload_mb() -> usize {
    512
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            dev: false,
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl ServerSection {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

/// Image build settings. Directory names are relative to the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSection {
    #[serde(default = "default_projects_dir")]
    pub projects_dir: String,
    #[serde(default = "default_images_dir")]
    pub images_dir: String,
    #[serde(default = "default_dockerfile")]
    pub dockerfile: String,
    #[serde(default = "default_image_name")]
    pub image_name: String,
    #[serde(default = "default_docker_cmd")]
    pub docker_cmd: String,
    #[serde(default = "default_base_image")]
    pub default_base_image: String,
    #[serde(default = "default_entrypoint")]
    pub default_entrypoint: String,
    /// Per engine call, 0 disables the limit
    #[serde(default)]
    pub timeout_secs: u64,
}

fn default_projects_dir() -> String {
    "projects".to_string()
}

fn default_images_dir() -> String {
    "images".to_string()
}

fn default_dockerfile() -> String {
    "Dockerfile".to_string()
}

fn default_image_name() -> String {
    "my_image".to_string()
}

fn default_docker_cmd() -> String {
    "docker".to_string()
}

fn default_base_image() -> String {
    "python:3.8".to_string()
}

fn default_entrypoint() -> String {
    "app.py".to_string()
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            projects_dir: default_projects_dir(),
            images_dir: default_images_dir(),
            dockerfile: default_dockerfile(),
            image_name: default_image_name(),
            docker_cmd: default_docker_cmd(),
            default_base_image: default_base_image(),
            default_entrypoint: default_entrypoint(),
            timeout_secs: 0,
        }
    }
}

impl BuildSection {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// File name of the exported archive, e.g. `my_image_latest.tar`.
    pub fn archive_name(&self) -> String {
        let name = match self.image_name.rsplit_once(':') {
            Some((repo, tag)) if !tag.contains('/') => format!("{}_{}", repo, tag),
            _ => format!("{}_latest", self.image_name),
        };
        format!("{}.tar", name.replace(['/', ':'], "_"))
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Invalid log format '{}'. Valid values: pretty, json", s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Write to a daily rolling file in this directory instead of stderr
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            dir: None,
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DockyardConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub build: BuildSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl DockyardConfig {
    /// Load configuration from `path`. Returns defaults if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup("DOCKYARD_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("DOCKYARD_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("DOCKYARD_PORT is not a valid port: {}", port))?;
        }
        if let Some(cmd) = lookup("DOCKER_CMD") {
            self.build.docker_cmd = cmd;
        }
        if let Some(image) = lookup("DOCKYARD_IMAGE") {
            self.build.image_name = image;
        }
        if let Some(level) = lookup("DOCKYARD_LOG") {
            self.logging.level = level;
        }
        Ok(())
    }
}

/// Resolved filesystem locations for one working directory.
#[derive(Debug, Clone)]
pub struct BuildPaths {
    pub work_dir: PathBuf,
    pub projects_dir: PathBuf,
    pub images_dir: PathBuf,
    pub dockerfile: PathBuf,
}

impl BuildPaths {
    pub fn new(work_dir: impl Into<PathBuf>, build: &BuildSection) -> Self {
        let work_dir = work_dir.into();
        Self {
            projects_dir: work_dir.join(&build.projects_dir),
            images_dir: work_dir.join(&build.images_dir),
            dockerfile: work_dir.join(&build.dockerfile),
            work_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    #[test]
    fn test_config_defaults() {
        let config = DockyardConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert!(!config.server.dev);
        assert_eq!(config.build.projects_dir, "projects");
        assert_eq!(config.build.images_dir, "images");
        assert_eq!(config.build.image_name, "my_image");
        assert_eq!(config.build.default_base_image, "python:3.8");
        assert_eq!(config.build.default_entrypoint, "app.py");
        assert!(config.build.timeout().is_none());
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_config_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = DockyardConfig::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_config_load_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"
[server]
port = 9000

[build]
image_name = "shop:v2"
timeout_secs = 600

[logging]
format = "json"
"#,
        )
        .unwrap();

        let config = DockyardConfig::load(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1"); // default
        assert_eq!(config.build.image_name, "shop:v2");
        assert_eq!(config.build.timeout(), Some(Duration::from_secs(600)));
        assert_eq!(config.build.projects_dir, "projects"); // default
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "not valid toml {{{{").unwrap();

        let err = DockyardConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn test_config_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("DOCKYARD_PORT", "8081"),
            ("DOCKER_CMD", "podman"),
            ("DOCKYARD_IMAGE", "custom"),
        ]
        .into_iter()
        .collect();

        let mut config = DockyardConfig::default();
        config
            .apply_env_from(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.build.docker_cmd, "podman");
        assert_eq!(config.build.image_name, "custom");
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_config_env_invalid_port() {
        let mut config = DockyardConfig::default();
        let result =
            config.apply_env_from(|key| (key == "DOCKYARD_PORT").then(|| "lots".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_archive_name() {
        let mut build = BuildSection::default();
        assert_eq!(build.archive_name(), "my_image_latest.tar");

        build.image_name = "shop:v2".into();
        assert_eq!(build.archive_name(), "shop_v2.tar");

        build.image_name = "localhost:5000/shop".into();
        assert_eq!(build.archive_name(), "localhost_5000_shop_latest.tar");
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_build_paths_are_rooted_in_work_dir() {
        let paths = BuildPaths::new("/srv/dockyard", &BuildSection::default());
        assert_eq!(paths.projects_dir, PathBuf::from("/srv/dockyard/projects"));
        assert_eq!(paths.images_dir, PathBuf::from("/srv/dockyard/images"));
        assert_eq!(paths.dockerfile, PathBuf::from("/srv/dockyard/Dockerfile"));
    }
}
