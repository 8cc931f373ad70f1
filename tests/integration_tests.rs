//! Integration tests for Dockyard
//!
//! These tests drive the binaries and the public library API end to end.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a dockyard Command
fn dockyard() -> Command {
    cargo_bin_cmd!("dockyard")
}

/// Helper to create a temporary working directory
fn create_temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_snake_refuses_to_run_without_terminal() {
        // assert_cmd pipes stdout, so the game never sees a TTY here
        cargo_bin_cmd!("snake")
            .timeout(std::time::Duration::from_secs(10))
            .assert()
            .failure()
            .stderr(predicate::str::contains("interactive terminal"));
    }

    #[test]
    fn test_dockyard_help() {
        dockyard()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--work-dir"))
            .stdout(predicate::str::contains("--log-format"));
    }

    #[test]
    fn test_dockyard_version() {
        dockyard()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_invalid_log_format_is_rejected() {
        dockyard()
            .args(["--log-format", "xml"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid log format"));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        dockyard()
            .args(["--port", "not-a-port"])
            .assert()
            .failure();
    }
}

// =============================================================================
// Configuration Tests
// =============================================================================

mod configuration {
    use super::*;

    #[test]
    fn test_malformed_config_file_fails_startup() {
        let dir = create_temp_dir();
        fs::write(dir.path().join("dockyard.toml"), "[server\nport = 1").unwrap();

        dockyard()
            .current_dir(dir.path())
            .env_remove("RUST_LOG")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to parse"))
            .stderr(predicate::str::contains("dockyard.toml"));
    }

    #[test]
    fn test_explicit_config_path_is_used() {
        let dir = create_temp_dir();
        let config = dir.path().join("custom.toml");
        fs::write(&config, "[build]\ntimeout_secs = \"soon\"\n").unwrap();

        dockyard()
            .current_dir(dir.path())
            .arg("--config")
            .arg(&config)
            .assert()
            .failure()
            .stderr(predicate::str::contains("custom.toml"));
    }

    #[test]
    fn test_invalid_port_in_environment_fails_startup() {
        let dir = create_temp_dir();

        dockyard()
            .current_dir(dir.path())
            .env("DOCKYARD_PORT", "eighty")
            .assert()
            .failure()
            .stderr(predicate::str::contains("DOCKYARD_PORT"));
    }

    #[test]
    fn test_invalid_port_in_dotenv_fails_startup() {
        let dir = create_temp_dir();
        fs::write(dir.path().join(".env"), "DOCKYARD_PORT=eighty\n").unwrap();

        dockyard()
            .current_dir(dir.path())
            .env_remove("DOCKYARD_PORT")
            .assert()
            .failure()
            .stderr(predicate::str::contains("DOCKYARD_PORT"));
    }
}

// =============================================================================
// Image Build Pipeline Tests
// =============================================================================

mod image_pipeline {
    use super::*;
    use async_trait::async_trait;
    use dockyard::builder::api::AppState;
    use dockyard::builder::engine::ImageEngine;
    use dockyard::builder::pipeline::ImageBuilder;
    use dockyard::builder::server::build_router;
    use dockyard::config::BuildSection;
    use dockyard::errors::BuildError;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::path::Path;
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "integration-boundary";

    /// Engine that accepts any context that contains a requirements file.
    struct RecordingEngine;

    #[async_trait]
    impl ImageEngine for RecordingEngine {
        async fn build(
            &self,
            context: &Path,
            dockerfile: &Path,
            _image: &str,
        ) -> Result<(), BuildError> {
            assert!(dockerfile.exists());
            if !context.join("projects/requirements.txt").exists() {
                return Err(BuildError::BuildFailed {
                    code: Some(1),
                    stderr: "failed to compute cache key: \"/projects/requirements.txt\": not found"
                        .into(),
                });
            }
            Ok(())
        }

        async fn tags(&self, image: &str) -> Result<Vec<String>, BuildError> {
            Ok(vec![format!("{}:latest", image)])
        }

        async fn save(&self, _image: &str, output: &Path) -> Result<(), BuildError> {
            fs::write(output, b"archive").map_err(|source| BuildError::Io {
                path: output.to_path_buf(),
                source,
            })
        }

        async fn ping(&self) -> Result<(), BuildError> {
            Ok(())
        }
    }

    fn router(dir: &Path) -> axum::Router {
        let builder = ImageBuilder::new(dir, BuildSection::default(), Arc::new(RecordingEngine));
        build_router(Arc::new(AppState { builder }), 1024 * 1024, false)
    }

    fn file_part(body: &mut String, name: &str, file_name: &str, content: &str) {
        body.push_str(&format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {content}\r\n"
        ));
    }

    fn text_part(body: &mut String, name: &str, value: &str) {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }

    fn upload(body: String) -> Request<Body> {
        let body = format!("{body}--{BOUNDARY}--\r\n");
        Request::builder()
            .method("POST")
            .uri("/create_docker_image/")
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_full_upload_produces_archive() {
        let dir = create_temp_dir();
        let mut body = String::new();
        file_part(&mut body, "project_files", "app.py", "print('hi')\n");
        file_part(&mut body, "user_requirements", "requirements.txt", "flask\n");
        text_part(&mut body, "tech_stack", "python:3.11-slim");
        text_part(&mut body, "executable_file", "app.py");

        let resp = router(dir.path()).oneshot(upload(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = json(resp).await;
        assert_eq!(json["message"], "Docker image created and saved");
        assert_eq!(json["image"][0], "my_image:latest");
        assert_eq!(json["image_path"], "images/my_image_latest.tar");

        assert!(dir.path().join("projects/app.py").exists());
        assert!(dir.path().join("images/my_image_latest.tar").exists());
        let dockerfile = fs::read_to_string(dir.path().join("Dockerfile")).unwrap();
        assert!(dockerfile.starts_with("FROM python:3.11-slim"));
        assert!(dockerfile.contains("CMD [\"python\", \"/app/projects/app.py\"]"));
    }

    #[tokio::test]
    async fn test_upload_without_requirements_reports_engine_failure() {
        let dir = create_temp_dir();
        let mut body = String::new();
        file_part(&mut body, "project_files", "main.py", "print('hi')\n");
        text_part(&mut body, "tech_stack", "python:3.8");
        text_part(&mut body, "executable_file", "main.py");

        let resp = router(dir.path()).oneshot(upload(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = json(resp).await;
        let detail = json["detail"].as_str().unwrap();
        assert!(detail.contains("requirements.txt"), "detail: {detail}");
        // The Dockerfile still names the manifest
        let dockerfile = fs::read_to_string(dir.path().join("Dockerfile")).unwrap();
        assert!(dockerfile.contains("COPY projects/requirements.txt /app/requirements.txt"));
    }

    #[tokio::test]
    async fn test_upload_without_project_is_rejected_before_writing() {
        let dir = create_temp_dir();
        let mut body = String::new();
        file_part(&mut body, "user_requirements", "requirements.txt", "flask\n");
        text_part(&mut body, "tech_stack", "python:3.8");

        let resp = router(dir.path()).oneshot(upload(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(resp).await["detail"], "No file uploaded");
        assert!(!dir.path().join("projects").exists());
        assert!(!dir.path().join("Dockerfile").exists());
    }
}

// =============================================================================
// Snake Game Rules
// =============================================================================

mod game_rules {
    use dockyard::game::canvas::BufferCanvas;
    use dockyard::game::entity::{
        APPLE_COLOR, Apple, BOARD_BACKGROUND_COLOR, Drawable, STONE_COLOR, Stone,
    };
    use dockyard::game::{
        Board, Cell, Collision, Direction, Game, InputEvent, InputKey, Snake, Tick,
    };
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn play(snake: Snake, apple: Cell, stone: Cell) -> (Game<StdRng>, BufferCanvas) {
        let board = Board::default();
        let game = Game::from_parts(
            board,
            snake,
            Apple::new(apple, APPLE_COLOR),
            Stone::new(stone, STONE_COLOR),
            StdRng::seed_from_u64(7),
        );
        (game, BufferCanvas::new(board, BOARD_BACKGROUND_COLOR))
    }

    #[test]
    fn test_eating_three_apples_in_a_row() {
        let (mut game, mut canvas) = play(
            Snake::new(Cell::new(100, 100)),
            Cell::new(120, 100),
            Cell::new(0, 460),
        );

        let mut eaten = 0;
        for _ in 0..3 {
            // Steer the apple right in front of the head each time
            let ahead = game.board().step(game.snake().head(), game.snake().direction());
            let stone = game.stone().position();
            let (next, _) = play(game.snake().clone(), ahead, stone);
            game = next;
            if game.tick(&mut canvas, &[]) == Tick::Advanced(Some(Collision::Apple)) {
                eaten += 1;
            }
        }
        game.tick(&mut canvas, &[]);

        assert_eq!(eaten, 3);
        assert_eq!(game.snake().len(), 4);
    }

    #[test]
    fn test_circling_back_resets_snake() {
        let board = Board::default();
        let body = [(200, 200), (180, 200), (160, 200), (140, 200), (120, 200)]
            .map(|(x, y)| Cell::new(x, y));
        let snake = Snake::from_cells(&board, body, Direction::Right).unwrap();
        let (mut game, mut canvas) = play(snake, Cell::new(600, 20), Cell::new(600, 40));

        // Right, then down, left, up into the body
        game.tick(&mut canvas, &[InputEvent::Key(InputKey::Down)]);
        game.tick(&mut canvas, &[InputEvent::Key(InputKey::Left)]);
        game.tick(&mut canvas, &[InputEvent::Key(InputKey::Up)]);
        let outcome = game.tick(&mut canvas, &[]);

        assert_eq!(outcome, Tick::Advanced(Some(Collision::Body)));
        assert_eq!(game.snake().len(), 1);
        assert_eq!(game.snake().head(), board.center());
    }

    #[test]
    fn test_stone_never_kills() {
        let (mut game, mut canvas) = play(
            Snake::new(Cell::new(100, 100)),
            Cell::new(600, 20),
            Cell::new(120, 100),
        );
        assert_eq!(game.tick(&mut canvas, &[]), Tick::Advanced(Some(Collision::Stone)));
        assert_eq!(game.snake().len(), 1);
        assert!(!game.snake().contains(game.stone().position()));
    }

    #[test]
    fn test_long_run_keeps_items_off_the_snake() {
        let mut game = Game::new(Board::default(), StdRng::seed_from_u64(2024));
        let mut canvas = BufferCanvas::new(*game.board(), BOARD_BACKGROUND_COLOR);
        let keys = [InputKey::Up, InputKey::Left, InputKey::Down, InputKey::Right];

        for step in 0..2_000 {
            let events = if step % 7 == 0 {
                vec![InputEvent::Key(keys[(step / 7) % keys.len()])]
            } else {
                Vec::new()
            };
            let outcome = game.tick(&mut canvas, &events);
            match outcome {
                Tick::Advanced(Some(Collision::Apple)) => {
                    assert!(!game.snake().contains(game.apple().position()));
                }
                Tick::Advanced(Some(Collision::Stone)) => {
                    assert!(!game.snake().contains(game.stone().position()));
                }
                _ => {}
            }
            assert!(game.snake().len() >= 1);
            assert!(game.board().contains(game.snake().head()));
        }
        assert!(game.board().contains(game.apple().position()));
        assert!(game.board().contains(game.stone().position()));
    }
}
