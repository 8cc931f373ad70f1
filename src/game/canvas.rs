//! Render context for the game.
//!
//! Draw operations take a `&mut dyn Canvas` instead of touching a global
//! window, so the loop runs the same against a terminal or an in-memory buffer.

use super::board::{Board, Cell};

/// 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Nearest entry of the xterm 6×6×6 color cube.
    pub fn to_ansi256(self) -> u8 {
        let level = |c: u8| ((c as u16 * 5 + 127) / 255) as u8;
        16 + 36 * level(self.0) + 6 * level(self.1) + level(self.2)
    }
}

pub trait Canvas {
    /// Paint the whole board.
    fn fill(&mut self, color: Rgb);

    /// Paint one cell, removing any outline it had.
    fn fill_cell(&mut self, cell: Cell, color: Rgb);

    /// Draw a one-pixel outline around a cell.
    fn outline_cell(&mut self, cell: Cell, color: Rgb);
}

/// What one cell currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPaint {
    pub fill: Rgb,
    pub border: Option<Rgb>,
}

/// In-memory canvas with one entry per grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferCanvas {
    board: Board,
    cells: Vec<CellPaint>,
}

impl BufferCanvas {
    pub fn new(board: Board, background: Rgb) -> Self {
        let blank = CellPaint {
            fill: background,
            border: None,
        };
        Self {
            board,
            cells: vec![blank; board.cell_count()],
        }
    }

    pub fn board(&self) -> Board {
        self.board
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if !self.board.contains(cell) {
            return None;
        }
        let (column, row) = self.board.grid_position(cell);
        Some(row * self.board.columns() as usize + column)
    }

    pub fn paint(&self, cell: Cell) -> Option<CellPaint> {
        self.index(cell).map(|i| self.cells[i])
    }

    /// Fill color of a cell, `None` when off the board.
    pub fn color_at(&self, cell: Cell) -> Option<Rgb> {
        self.paint(cell).map(|p| p.fill)
    }

    /// Row-major iterator over `(column, row, paint)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, CellPaint)> + '_ {
        let columns = self.board.columns() as usize;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, paint)| (i % columns, i / columns, *paint))
    }
}

impl Canvas for BufferCanvas {
    fn fill(&mut self, color: Rgb) {
        for paint in &mut self.cells {
            *paint = CellPaint {
                fill: color,
                border: None,
            };
        }
    }

    fn fill_cell(&mut self, cell: Cell, color: Rgb) {
        if let Some(i) = self.index(cell) {
            self.cells[i] = CellPaint {
                fill: color,
                border: None,
            };
        }
    }

    fn outline_cell(&mut self, cell: Cell, color: Rgb) {
        if let Some(i) = self.index(cell) {
            self.cells[i].border = Some(color);
        }
    }
}
