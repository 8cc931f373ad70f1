use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use dockyard::builder::server::{ServerConfig, start_server};
use dockyard::config::{CONFIG_FILE, DockyardConfig, LogFormat};
use dockyard::logging;

#[derive(Parser)]
#[command(name = "dockyard")]
#[command(version, about = "Build a Docker image archive from an uploaded project")]
pub struct Cli {
    /// Log at debug level (overrides the configured level, not RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to the config file. Defaults to dockyard.toml in the working directory
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory that receives projects/, images/ and the Dockerfile
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable permissive CORS for a front-end served from another origin
    #[arg(long)]
    pub dev: bool,

    /// Log line format: pretty or json
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// Write logs to a daily rolling file in this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut DockyardConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.dev {
            config.server.dev = true;
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Some(dir) = &self.log_dir {
            config.logging.dir = Some(dir.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let work_dir = match cli.work_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| work_dir.join(CONFIG_FILE));

    let mut settings = DockyardConfig::load(&config_path)?;
    settings.apply_env()?;
    cli.apply(&mut settings);

    // Held until exit so buffered file logs are flushed
    let _log_guard = logging::init(&settings.logging)?;
    tracing::debug!(config = %config_path.display(), "configuration loaded");

    start_server(ServerConfig { work_dir, settings }).await
}
