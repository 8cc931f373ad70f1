use rand::Rng;
use rand::rngs::StdRng;

use super::board::Board;
use super::canvas::Canvas;
use super::direction::{InputEvent, TurnTable};
use super::entity::{APPLE_COLOR, Apple, BOARD_BACKGROUND_COLOR, Drawable, STONE_COLOR, Stone};
use super::snake::Snake;

/// What the head ran into during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Apple,
    Body,
    Stone,
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Advanced(Option<Collision>),
    Quit,
}

/// Complete game state. The only state is "running"; losing resets in place.
pub struct Game<R: Rng = StdRng> {
    board: Board,
    snake: Snake,
    apple: Apple,
    stone: Stone,
    turns: TurnTable,
    rng: R,
}

impl<R: Rng> Game<R> {
    /// Fresh game: one-cell snake in the center, apple and stone placed at random.
    pub fn new(board: Board, mut rng: R) -> Self {
        let snake = Snake::new(board.center());
        let apple = Apple::spawn(&board, &snake, APPLE_COLOR, &mut rng);
        let stone = Stone::spawn(&board, &snake, STONE_COLOR, &mut rng);
        Self::from_parts(board, snake, apple, stone, rng)
    }

    /// Game with an explicit layout.
    pub fn from_parts(board: Board, snake: Snake, apple: Apple, stone: Stone, rng: R) -> Self {
        Self {
            board,
            snake,
            apple,
            stone,
            turns: TurnTable::default(),
            rng,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn apple(&self) -> &Apple {
        &self.apple
    }

    pub fn stone(&self) -> &Stone {
        &self.stone
    }

    /// Clear the canvas before the first tick.
    pub fn start(&self, canvas: &mut dyn Canvas) {
        canvas.fill(BOARD_BACKGROUND_COLOR);
    }

    /// Advance the game by one step, applying the input polled since the last tick.
    pub fn tick(&mut self, canvas: &mut dyn Canvas, events: &[InputEvent]) -> Tick {
        self.stone.draw(canvas);
        self.apple.draw(canvas);

        self.snake.advance(&self.board);
        self.snake.draw(canvas);

        for event in events {
            match *event {
                InputEvent::Quit => return Tick::Quit,
                InputEvent::Key(key) => {
                    if let Some(direction) = self.turns.turn(key, self.snake.direction()) {
                        self.snake.stage(direction);
                    }
                }
            }
        }
        self.snake.update_direction();

        Tick::Advanced(self.resolve_collision(canvas))
    }

    fn resolve_collision(&mut self, canvas: &mut dyn Canvas) -> Option<Collision> {
        let head = self.snake.head();

        if head == self.apple.position() {
            self.snake.feed();
            self.apple.relocate(&self.board, &self.snake, &mut self.rng);
            tracing::debug!(
                length = self.snake.len(),
                apple = %self.apple.position(),
                "apple eaten"
            );
            Some(Collision::Apple)
        } else if self.snake.bites_itself() {
            tracing::debug!(length = self.snake.len(), "snake bit itself, resetting");
            canvas.fill(BOARD_BACKGROUND_COLOR);
            self.snake.reset(self.board.center());
            Some(Collision::Body)
        } else if head == self.stone.position() {
            self.snake.shrink();
            canvas.fill(BOARD_BACKGROUND_COLOR);
            self.stone.relocate(&self.board, &self.snake, &mut self.rng);
            tracing::debug!(
                length = self.snake.len(),
                stone = %self.stone.position(),
                "hit a stone"
            );
            Some(Collision::Stone)
        } else {
            None
        }
    }
}
