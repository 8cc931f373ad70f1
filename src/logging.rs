//! `tracing` subscriber installation shared by both binaries.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::{LogFormat, LoggingSection};

/// File name prefix for rolling log files.
pub const LOG_FILE_PREFIX: &str = "dockyard.log";

/// Where log lines end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Daily rolling file in the given directory
    Directory(PathBuf),
}

impl LogTarget {
    pub fn from_dir(dir: Option<&Path>) -> Self {
        match dir {
            Some(dir) => LogTarget::Directory(dir.to_path_buf()),
            None => LogTarget::Stderr,
        }
    }
}

/// Build the env filter: `RUST_LOG` wins, `default_directive` otherwise.
pub fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process when logging to a directory.
pub fn init(settings: &LoggingSection) -> Result<Option<WorkerGuard>> {
    let target = LogTarget::from_dir(settings.dir.as_deref());
    install(&settings.level, settings.format, target)
}

pub fn install(
    default_directive: &str,
    format: LogFormat,
    target: LogTarget,
) -> Result<Option<WorkerGuard>> {
    let (writer, guard) = match target {
        LogTarget::Stderr => (BoxMakeWriter::new(std::io::stderr), None),
        LogTarget::Directory(dir) => {
            std::fs::create_dir_all(&dir).map_err(|e| {
                anyhow::anyhow!("Failed to create log directory {}: {}", dir.display(), e)
            })?;
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directive))
        .with_writer(writer);

    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(guard)
}
