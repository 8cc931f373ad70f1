use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;

use dockyard::config::LogFormat;
use dockyard::game::{self, Board, Game};
use dockyard::logging::{self, LogTarget};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Anything louder than warn would scribble over the board
    let _log_guard = logging::install("warn", LogFormat::Pretty, LogTarget::Stderr)?;

    let session = Game::new(Board::default(), StdRng::from_entropy());
    game::play(session).await?;
    Ok(())
}
