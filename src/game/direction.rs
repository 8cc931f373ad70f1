use std::collections::HashMap;

/// Heading of the snake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step in grid cells; y grows downwards.
    pub fn vector(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Directional keys the game reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKey {
    Up,
    Down,
    Left,
    Right,
}

impl InputKey {
    pub const ALL: [InputKey; 4] = [InputKey::Up, InputKey::Down, InputKey::Left, InputKey::Right];
}

/// One polled input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(InputKey),
    /// Window close / quit request
    Quit,
}

/// `(key, current direction) → new direction` lookup.
///
/// Only perpendicular turns have entries. A key that would reverse the snake
/// onto itself, or repeat its current heading, has no entry and is ignored.
#[derive(Debug, Clone)]
pub struct TurnTable {
    rules: HashMap<(InputKey, Direction), Direction>,
}

impl Default for TurnTable {
    fn default() -> Self {
        let rules = HashMap::from([
            ((InputKey::Up, Direction::Right), Direction::Up),
            ((InputKey::Up, Direction::Left), Direction::Up),
            ((InputKey::Down, Direction::Right), Direction::Down),
            ((InputKey::Down, Direction::Left), Direction::Down),
            ((InputKey::Left, Direction::Up), Direction::Left),
            ((InputKey::Left, Direction::Down), Direction::Left),
            ((InputKey::Right, Direction::Up), Direction::Right),
            ((InputKey::Right, Direction::Down), Direction::Right),
        ]);
        Self { rules }
    }
}

impl TurnTable {
    pub fn turn(&self, key: InputKey, current: Direction) -> Option<Direction> {
        self.rules.get(&(key, current)).copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
