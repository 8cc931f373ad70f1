//! Image builder — upload a project, get a Docker image archive back.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────┐ multipart ┌───────────────────────────────────────────────┐
//! │  Client  │ ────────> │  server.rs  (axum Router, ServerConfig)       │
//! │  (React) │ <──────── │    └─ api.rs  (handler, form parsing, AppState)│
//! └──────────┘    JSON   │         │                                     │
//!                        │         │ ImageBuilder::build()               │
//!                        │         v                                     │
//!                        │  pipeline.rs  (uploads → Dockerfile → image)  │
//!                        │         │                                     │
//!                        │         │ DockerfileTemplate::render()        │
//!                        │         │ ImageEngine::build/tags/save        │
//!                        │         v                                     │
//!                        │  engine.rs  (DockerEngine: CLI + bollard)     │
//!                        └───────────────────────────────────────────────┘
//! ```
//!
//! ## Request Flow (`POST /create_docker_image/`)
//!
//! 1. `api::create_docker_image()` reads every multipart field into memory and
//!    validates the form. A missing project file is a 400 before any write.
//! 2. `ImageBuilder::build()` takes the build lock, writes the project file and
//!    the optional `requirements.txt` into `projects/`, then renders the
//!    `Dockerfile` into the working directory.
//! 3. The engine builds the working directory as the context, reports the
//!    image's tags, and exports it to `images/<name>_<tag>.tar`.
//! 4. The handler answers with the tags and the archive path.
//!
//! A request without `requirements.txt` still renders a Dockerfile that copies
//! it, so the engine build fails unless an earlier upload left one behind.

pub mod api;
pub mod dockerfile;
pub mod engine;
pub mod pipeline;
pub mod server;
