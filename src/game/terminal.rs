//! Terminal front end: renders the board with 256-color blocks and maps keys.
//!
//! Each grid cell is two characters wide so cells look roughly square.
//! Only cells that changed since the last frame are rewritten.

use std::io;

use console::{Key, Term, style};

use super::board::{Board, Cell};
use super::canvas::{BufferCanvas, Canvas, CellPaint, Rgb};
use super::direction::{InputEvent, InputKey};
use super::entity::BOARD_BACKGROUND_COLOR;

/// Characters used for one cell.
const CELL_WIDTH: usize = 2;

pub struct TerminalCanvas {
    frame: BufferCanvas,
    shown: Option<BufferCanvas>,
    term: Term,
}

impl TerminalCanvas {
    /// Take over stdout: clear it and hide the cursor until dropped.
    pub fn new(board: Board) -> io::Result<Self> {
        let term = Term::stdout();
        term.clear_screen()?;
        term.hide_cursor()?;
        Ok(Self {
            frame: BufferCanvas::new(board, BOARD_BACKGROUND_COLOR),
            shown: None,
            term,
        })
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    /// Flush the current frame to the terminal, followed by a status line.
    pub fn present(&mut self, status: &str) -> io::Result<()> {
        let rows = self.frame.board().rows() as usize;
        let previous: Vec<CellPaint> = self
            .shown
            .as_ref()
            .map(|shown| shown.iter().map(|(_, _, paint)| paint).collect())
            .unwrap_or_default();

        for (index, (column, row, paint)) in self.frame.iter().enumerate() {
            if previous.get(index) == Some(&paint) {
                continue;
            }
            self.term.move_cursor_to(column * CELL_WIDTH, row)?;
            self.term.write_str(&render_cell(paint))?;
        }

        self.term.move_cursor_to(0, rows)?;
        self.term.clear_line()?;
        self.term.write_str(status)?;
        self.term.flush()?;

        self.shown = Some(self.frame.clone());
        Ok(())
    }
}

impl Canvas for TerminalCanvas {
    fn fill(&mut self, color: Rgb) {
        self.frame.fill(color);
    }

    fn fill_cell(&mut self, cell: Cell, color: Rgb) {
        self.frame.fill_cell(cell, color);
    }

    fn outline_cell(&mut self, cell: Cell, color: Rgb) {
        self.frame.outline_cell(cell, color);
    }
}

impl Drop for TerminalCanvas {
    fn drop(&mut self) {
        let rows = self.frame.board().rows() as usize;
        let _ = self.term.move_cursor_to(0, rows + 1);
        let _ = self.term.show_cursor();
    }
}

/// Styled text for one cell; outlined cells show brackets in the border color.
fn render_cell(paint: CellPaint) -> String {
    let background = paint.fill.to_ansi256();
    match paint.border {
        Some(border) => style("[]")
            .color256(border.to_ansi256())
            .on_color256(background)
            .to_string(),
        None => style(" ".repeat(CELL_WIDTH)).on_color256(background).to_string(),
    }
}

/// Translate a key press into a game event. Unhandled keys map to `None`.
pub fn map_key(key: Key) -> Option<InputEvent> {
    match key {
        Key::ArrowUp => Some(InputEvent::Key(InputKey::Up)),
        Key::ArrowDown => Some(InputEvent::Key(InputKey::Down)),
        Key::ArrowLeft => Some(InputEvent::Key(InputKey::Left)),
        Key::ArrowRight => Some(InputEvent::Key(InputKey::Right)),
        Key::Escape | Key::CtrlC | Key::Char('q') | Key::Char('Q') => Some(InputEvent::Quit),
        _ => None,
    }
}
