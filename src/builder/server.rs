use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, extract::DefaultBodyLimit};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::api::{self, AppState};
use super::engine::{DockerEngine, ImageEngine};
use super::pipeline::ImageBuilder;
use crate::config::DockyardConfig;

/// Configuration for the build server.
pub struct ServerConfig {
    pub work_dir: PathBuf,
    pub settings: DockyardConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            settings: DockyardConfig::default(),
        }
    }
}

/// Build the full application router.
pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize, dev_mode: bool) -> Router {
    let mut app = api::api_router()
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if dev_mode {
        app = app.layer(CorsLayer::permissive());
    }
    app
}

/// Start the build server.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let ServerConfig { work_dir, settings } = config;

    let engine = DockerEngine::connect(settings.build.docker_cmd.clone())
        .context("Failed to initialize container engine client")?;
    if let Err(e) = engine.ping().await {
        tracing::warn!(
            error = %e,
            "container engine is not reachable; builds will fail until it is"
        );
    }

    let builder = ImageBuilder::new(&work_dir, settings.build.clone(), Arc::new(engine));
    let state = Arc::new(AppState { builder });
    let app = build_router(state, settings.server.max_upload_bytes(), settings.server.dev);

    let addr = settings.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    tracing::info!(work_dir = %work_dir.display(), "dockyard listening on http://{}", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
