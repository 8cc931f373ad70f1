//! Typed error hierarchy for dockyard.
//!
//! Two top-level enums cover the two subsystems:
//! - `BuildError` — image-build pipeline and container engine failures
//! - `GameError` — invalid snake layouts handed to the game

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the image-build pipeline.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("No file uploaded")]
    NoProjectFile,

    #[error("Invalid value for '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Image build failed (exit code {code:?}): {stderr}")]
    BuildFailed { code: Option<i32>, stderr: String },

    #[error("Image export failed (exit code {code:?}): {stderr}")]
    ExportFailed { code: Option<i32>, stderr: String },

    #[error("Image export reported success but {path} was not written")]
    ArchiveMissing { path: PathBuf },

    #[error("Failed to inspect image: {0}")]
    Inspect(#[source] bollard::errors::Error),

    #[error("Container engine error: {0}")]
    Engine(String),

    #[error("{step} timed out after {secs}s")]
    TimedOut { step: &'static str, secs: u64 },
}

impl BuildError {
    /// Whether the failure was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, BuildError::NoProjectFile | BuildError::InvalidField { .. })
    }

    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        BuildError::InvalidField {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Errors from constructing game state by hand.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Snake body must contain at least one cell")]
    EmptyBody,

    #[error("Cell ({x}, {y}) is not aligned to the {cell_size}px grid")]
    Misaligned { x: i32, y: i32, cell_size: i32 },

    #[error("Snake segments {index} and {next} are not adjacent", next = .index + 1)]
    Disjoint { index: usize },
}
