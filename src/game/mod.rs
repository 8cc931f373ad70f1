//! Snake on a wrapping grid.
//!
//! The snake eats apples to grow and loses a segment when it hits a stone.
//! Running into its own body starts it over from the center. There is no
//! game-over screen: the loop runs until the player quits.
//!
//! ```text
//! runner ── tick clock, key thread ──► state::Game::tick
//!                                        │
//!             ┌──────────────┬───────────┼───────────────┐
//!             ▼              ▼           ▼               ▼
//!        snake::Snake   entity::Pickup  direction     canvas::Canvas
//!             └──── board::Board (grid math, wrap) ──────┘
//! ```
//!
//! Drawing goes through [`canvas::Canvas`]; the terminal front end lives in
//! [`terminal`] and tests use [`canvas::BufferCanvas`].

pub mod board;
pub mod canvas;
pub mod direction;
pub mod entity;
pub mod runner;
pub mod snake;
pub mod state;
pub mod terminal;

pub use board::{Board, Cell};
pub use direction::{Direction, InputEvent, InputKey};
pub use runner::{SPEED, play};
pub use snake::Snake;
pub use state::{Collision, Game, Tick};
