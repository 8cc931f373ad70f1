use rand::Rng;

use super::board::{Board, Cell};
use super::canvas::{Canvas, Rgb};
use super::snake::Snake;

pub const BOARD_BACKGROUND_COLOR: Rgb = Rgb(106, 79, 60);
pub const BORDER_COLOR: Rgb = Rgb(90, 212, 228);
pub const APPLE_COLOR: Rgb = Rgb(255, 99, 71);
pub const SNAKE_BODY_COLOR: Rgb = Rgb(34, 139, 34);
pub const SNAKE_HEAD_COLOR: Rgb = Rgb(11, 102, 37);
pub const STONE_COLOR: Rgb = Rgb(122, 122, 122);

/// Something with a position and a color that can paint itself.
pub trait Drawable {
    fn position(&self) -> Cell;

    fn color(&self) -> Rgb;

    /// Filled cell with a border.
    fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.fill_cell(self.position(), self.color());
        canvas.outline_cell(self.position(), BORDER_COLOR);
    }
}

/// Single-cell item placed on a random cell the snake does not occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pickup {
    position: Cell,
    color: Rgb,
}

impl Pickup {
    pub fn new(position: Cell, color: Rgb) -> Self {
        Self { position, color }
    }

    pub fn spawn<R: Rng + ?Sized>(
        board: &Board,
        snake: &Snake,
        color: Rgb,
        rng: &mut R,
    ) -> Self {
        let mut pickup = Self::new(board.center(), color);
        pickup.relocate(board, snake, rng);
        pickup
    }

    /// Move to a random cell outside the snake. Stays put if there is none.
    pub fn relocate<R: Rng + ?Sized>(&mut self, board: &Board, snake: &Snake, rng: &mut R) {
        if let Some(cell) = board.random_free_cell(rng, snake.len(), |c| !snake.contains(c)) {
            self.position = cell;
        }
    }
}

impl Drawable for Pickup {
    fn position(&self) -> Cell {
        self.position
    }

    fn color(&self) -> Rgb {
        self.color
    }
}

/// Eating it makes the snake one cell longer.
pub type Apple = Pickup;

/// Hitting it makes the snake one cell shorter.
pub type Stone = Pickup;
