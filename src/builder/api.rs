use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

use super::pipeline::{BuildRequest, ImageBuilder, Upload};
use crate::errors::BuildError;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub builder: ImageBuilder,
}

pub type SharedState = Arc<AppState>;

// ── Response payload types ────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BuildResponse {
    pub message: String,
    pub image: Vec<String>,
    pub image_path: String,
}

// ── Error handling ────────────────────────────────────────────────────

pub enum ApiError {
    BadRequest(String),
    /// Transport-level rejection with its own status, e.g. 413 past the body limit
    Rejected(StatusCode, String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Rejected(status, msg) => (status, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"detail": message}))).into_response()
    }
}

impl From<BuildError> for ApiError {
    fn from(err: BuildError) -> Self {
        if err.is_client_error() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl ApiError {
    /// Keep the status the multipart layer picked (400 for bad framing, 413 past the limit).
    fn multipart(context: &str, err: MultipartError) -> Self {
        ApiError::Rejected(err.status(), format!("{}: {}", context, err))
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/create_docker_image/", post(create_docker_image))
        .route("/create_docker_image", post(create_docker_image))
        .route("/health", get(health_check))
}

// ── Form parsing ──────────────────────────────────────────────────────

/// Raw multipart fields before defaults and validation.
#[derive(Debug, Default)]
struct BuildForm {
    project_files: Option<Upload>,
    tech_stack: Option<String>,
    user_requirements: Option<Upload>,
    executable_file: Option<String>,
}

impl BuildForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = BuildForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::multipart("Malformed form data", e))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "project_files" => form.project_files = read_upload(field).await?,
                "user_requirements" => form.user_requirements = read_upload(field).await?,
                "tech_stack" => form.tech_stack = Some(read_text(field).await?),
                "executable_file" => form.executable_file = Some(read_text(field).await?),
                other => tracing::debug!(field = other, "ignoring unknown form field"),
            }
        }
        Ok(form)
    }

    /// Apply defaults and validate. Nothing touches the filesystem before this succeeds.
    fn into_request(
        self,
        default_base_image: &str,
        default_entrypoint: &str,
    ) -> Result<BuildRequest, BuildError> {
        let project = self
            .project_files
            .filter(|upload| upload.safe_file_name().is_some())
            .ok_or(BuildError::NoProjectFile)?;

        let base_image = template_value("tech_stack", self.tech_stack, default_base_image)?;
        let entrypoint =
            template_value("executable_file", self.executable_file, default_entrypoint)?;

        Ok(BuildRequest {
            project,
            requirements: self.user_requirements,
            base_image,
            entrypoint,
        })
    }
}

/// File parts without a file name are what browsers send for an empty file input.
async fn read_upload(field: Field<'_>) -> Result<Option<Upload>, ApiError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::multipart("Failed to read upload", e))?;
    if file_name.is_empty() {
        return Ok(None);
    }
    Ok(Some(Upload {
        file_name,
        bytes: bytes.to_vec(),
    }))
}

async fn read_text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::multipart("Failed to read form field", e))
}

/// Values spliced into the Dockerfile must stay on one line and inside the CMD quotes.
fn template_value(field: &str, value: Option<String>, default: &str) -> Result<String, BuildError> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string());
    if value.contains(['\n', '\r']) {
        return Err(BuildError::invalid_field(field, "must not contain line breaks"));
    }
    if value.contains('"') {
        return Err(BuildError::invalid_field(field, "must not contain double quotes"));
    }
    Ok(value)
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn create_docker_image(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = BuildForm::read(multipart).await?;
    let settings = state.builder.settings();
    let request = form
        .into_request(&settings.default_base_image, &settings.default_entrypoint)
        .inspect_err(|e| tracing::warn!(error = %e, "rejected build request"))?;

    let outcome = state
        .builder
        .build(request)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "image build failed"))?;

    Ok(Json(BuildResponse {
        message: "Docker image created and saved".to_string(),
        image: outcome.tags,
        image_path: outcome.archive.to_string_lossy().to_string(),
    }))
}
