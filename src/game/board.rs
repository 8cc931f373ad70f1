use rand::Rng;

use super::direction::Direction;

/// Board width in pixels.
pub const SCREEN_WIDTH: i32 = 640;
/// Board height in pixels.
pub const SCREEN_HEIGHT: i32 = 480;
/// Side of one grid cell in pixels.
pub const GRID_SIZE: i32 = 20;

/// Top-left corner of a grid cell, in pixels. Always a multiple of the cell size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Toroidal playing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    width: i32,
    height: i32,
    cell_size: i32,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(SCREEN_WIDTH, SCREEN_HEIGHT, GRID_SIZE)
    }
}

impl Board {
    /// Dimensions are rounded down to whole cells.
    pub fn new(width: i32, height: i32, cell_size: i32) -> Self {
        let cell_size = cell_size.max(1);
        let columns = (width / cell_size).max(1);
        let rows = (height / cell_size).max(1);
        Self {
            width: columns * cell_size,
            height: rows * cell_size,
            cell_size,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn cell_size(&self) -> i32 {
        self.cell_size
    }

    pub fn columns(&self) -> i32 {
        self.width / self.cell_size
    }

    pub fn rows(&self) -> i32 {
        self.height / self.cell_size
    }

    pub fn cell_count(&self) -> usize {
        (self.columns() * self.rows()) as usize
    }

    /// Starting cell for a fresh snake.
    pub fn center(&self) -> Cell {
        Cell::new(
            (self.columns() / 2) * self.cell_size,
            (self.rows() / 2) * self.cell_size,
        )
    }

    /// `true` when the cell is aligned to the grid and inside the board.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && cell.x < self.width
            && cell.y < self.height
            && cell.x % self.cell_size == 0
            && cell.y % self.cell_size == 0
    }

    /// Move one cell in `direction`, wrapping around the edges.
    pub fn step(&self, cell: Cell, direction: Direction) -> Cell {
        let (dx, dy) = direction.vector();
        Cell::new(
            (cell.x + dx * self.cell_size).rem_euclid(self.width),
            (cell.y + dy * self.cell_size).rem_euclid(self.height),
        )
    }

    /// `true` when `b` is one wrapped step away from `a`.
    pub fn adjacent(&self, a: Cell, b: Cell) -> bool {
        Direction::ALL.iter().any(|&d| self.step(a, d) == b)
    }

    /// Grid coordinates (column, row) of a cell.
    pub fn grid_position(&self, cell: Cell) -> (usize, usize) {
        (
            (cell.x / self.cell_size) as usize,
            (cell.y / self.cell_size) as usize,
        )
    }

    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Cell {
        Cell::new(
            rng.gen_range(0..self.columns()) * self.cell_size,
            rng.gen_range(0..self.rows()) * self.cell_size,
        )
    }

    /// Resample random cells until one satisfies `is_free`.
    ///
    /// Returns `None` only when `occupied` already covers the whole board.
    pub fn random_free_cell<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        occupied: usize,
        is_free: impl Fn(Cell) -> bool,
    ) -> Option<Cell> {
        if occupied >= self.cell_count() {
            return None;
        }
        loop {
            let cell = self.random_cell(rng);
            if is_free(cell) {
                return Some(cell);
            }
        }
    }
}
