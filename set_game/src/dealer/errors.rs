//! Error types for starting and running a game

use std::io;
use thiserror::Error;

use crate::game::config::ConfigError;

/// Result type for game lifecycle operations
pub type GameResult<T> = Result<T, GameError>;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to spawn thread: {0}")]
    Spawn(#[from] io::Error),

    #[error("dealer thread panicked")]
    DealerPanicked,
}
