use std::collections::VecDeque;

use super::board::{Board, Cell};
use super::canvas::{Canvas, Rgb};
use super::direction::Direction;
use super::entity::{
    BOARD_BACKGROUND_COLOR, BORDER_COLOR, Drawable, SNAKE_BODY_COLOR, SNAKE_HEAD_COLOR,
};
use crate::errors::GameError;

/// The player's snake. Head first; never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    positions: VecDeque<Cell>,
    direction: Direction,
    next_direction: Option<Direction>,
    ate: bool,
    /// Tail cell removed by the last move, erased on the next draw
    last: Option<Cell>,
}

impl Snake {
    /// One-cell snake heading right.
    pub fn new(start: Cell) -> Self {
        Self {
            positions: VecDeque::from([start]),
            direction: Direction::Right,
            next_direction: None,
            ate: false,
            last: None,
        }
    }

    /// Snake with an explicit body, head first.
    pub fn from_cells(
        board: &Board,
        cells: impl IntoIterator<Item = Cell>,
        direction: Direction,
    ) -> Result<Self, GameError> {
        let positions: VecDeque<Cell> = cells.into_iter().collect();
        if positions.is_empty() {
            return Err(GameError::EmptyBody);
        }
        if let Some(cell) = positions.iter().find(|c| !board.contains(**c)) {
            return Err(GameError::Misaligned {
                x: cell.x,
                y: cell.y,
                cell_size: board.cell_size(),
            });
        }
        for index in 0..positions.len() - 1 {
            if !board.adjacent(positions[index], positions[index + 1]) {
                return Err(GameError::Disjoint { index });
            }
        }
        Ok(Self {
            positions,
            direction,
            next_direction: None,
            ate: false,
            last: None,
        })
    }

    pub fn head(&self) -> Cell {
        self.positions[0]
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always `false`; a snake keeps at least its head.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = Cell> + '_ {
        self.positions.iter().copied()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.positions.contains(&cell)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn next_direction(&self) -> Option<Direction> {
        self.next_direction
    }

    pub fn has_eaten(&self) -> bool {
        self.ate
    }

    pub fn last_removed(&self) -> Option<Cell> {
        self.last
    }

    /// Record a turn to apply on the next `update_direction`.
    pub fn stage(&mut self, direction: Direction) {
        self.next_direction = Some(direction);
    }

    pub fn update_direction(&mut self) {
        if let Some(direction) = self.next_direction.take() {
            self.direction = direction;
        }
    }

    /// Grow by one cell on the next move.
    pub fn feed(&mut self) {
        self.ate = true;
    }

    /// Advance one cell. The tail is dropped unless the snake has just eaten.
    pub fn advance(&mut self, board: &Board) {
        let head = board.step(self.head(), self.direction);
        self.positions.push_front(head);
        if !self.ate {
            self.last = self.positions.pop_back();
        }
        self.ate = false;
    }

    /// `true` when the head sits on any other segment.
    pub fn bites_itself(&self) -> bool {
        let head = self.head();
        self.positions.iter().skip(1).any(|&c| c == head)
    }

    /// Back to a single cell heading right.
    pub fn reset(&mut self, start: Cell) {
        *self = Self::new(start);
    }

    /// Drop the tail segment, keeping at least the head.
    pub fn shrink(&mut self) {
        if self.positions.len() > 1 {
            self.positions.pop_back();
        }
    }
}

impl Drawable for Snake {
    fn position(&self) -> Cell {
        self.head()
    }

    fn color(&self) -> Rgb {
        SNAKE_BODY_COLOR
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        for &cell in &self.positions {
            canvas.fill_cell(cell, SNAKE_BODY_COLOR);
        }

        canvas.fill_cell(self.head(), SNAKE_HEAD_COLOR);
        canvas.outline_cell(self.head(), BORDER_COLOR);

        if let Some(last) = self.last {
            canvas.fill_cell(last, BOARD_BACKGROUND_COLOR);
        }
    }
}
