use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use console::Term;
use rand::Rng;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tokio::time::{self, MissedTickBehavior};

use super::canvas::{BufferCanvas, Canvas};
use super::direction::InputEvent;
use super::state::{Game, Tick};
use super::terminal::{TerminalCanvas, map_key};

/// Ticks per second.
pub const SPEED: u32 = 15;

/// A canvas whose frame can be pushed to the user once a tick is drawn.
pub trait Screen: Canvas {
    fn present(&mut self, status: &str) -> io::Result<()>;
}

impl Screen for TerminalCanvas {
    fn present(&mut self, status: &str) -> io::Result<()> {
        TerminalCanvas::present(self, status)
    }
}

impl Screen for BufferCanvas {
    fn present(&mut self, _status: &str) -> io::Result<()> {
        Ok(())
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub ticks: u64,
    pub length: usize,
}

/// Read keys on a blocking thread and forward the ones the game understands.
///
/// The thread ends when the receiver is dropped (after the next key press)
/// or when the terminal stops delivering keys. Without a terminal `read_key`
/// never blocks, so a non-terminal handle is reported as a quit right away.
pub fn spawn_key_reader(term: Term, events: UnboundedSender<InputEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        if !term.is_term() {
            tracing::warn!("Keyboard input is not a terminal");
            let _ = events.send(InputEvent::Quit);
            return;
        }
        loop {
            match term.read_key() {
                Ok(key) => {
                    let Some(event) = map_key(key) else {
                        continue;
                    };
                    if events.send(event).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Keyboard input unavailable: {}", e);
                    let _ = events.send(InputEvent::Quit);
                    break;
                }
            }
        }
    })
}

/// Everything queued since the last tick. A closed channel reads as a quit.
fn drain(input: &mut UnboundedReceiver<InputEvent>) -> Vec<InputEvent> {
    let mut events = Vec::new();
    loop {
        match input.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                events.push(InputEvent::Quit);
                break;
            }
        }
    }
    events
}

fn status_line(length: usize) -> String {
    format!("length {}   arrows steer, q quits", length)
}

/// Drive the game at `speed` ticks per second until the player quits or
/// Ctrl-C arrives.
pub async fn run<R: Rng, S: Screen>(
    game: &mut Game<R>,
    screen: &mut S,
    mut input: UnboundedReceiver<InputEvent>,
    speed: u32,
) -> Result<Summary> {
    let period = Duration::from_secs(1) / speed.max(1);
    let mut clock = time::interval(period);
    clock.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    game.start(screen);
    let mut ticks = 0u64;

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted, leaving the game");
                break;
            }
            _ = clock.tick() => {
                let events = drain(&mut input);
                if game.tick(screen, &events) == Tick::Quit {
                    break;
                }
                ticks += 1;
                screen
                    .present(&status_line(game.snake().len()))
                    .context("Failed to draw frame")?;
            }
        }
    }

    let summary = Summary {
        ticks,
        length: game.snake().len(),
    };
    tracing::info!(ticks = summary.ticks, length = summary.length, "Game over");
    Ok(summary)
}

/// Play in the current terminal until the player quits.
pub async fn play<R: Rng>(mut game: Game<R>) -> Result<Summary> {
    if !Term::stdout().is_term() {
        anyhow::bail!("snake needs an interactive terminal; stdout is not a TTY");
    }
    let board = *game.board();
    let mut screen = TerminalCanvas::new(board).context("Failed to prepare terminal")?;

    let (tx, rx) = mpsc::unbounded_channel();
    // Blocked in read_key; exits after the next key once the receiver is gone
    spawn_key_reader(screen.term().clone(), tx);

    run(&mut game, &mut screen, rx, SPEED).await
}
