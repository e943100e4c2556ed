use crate::core::Position;
use std::path::PathBuf;
use thiserror::Error;

/// Rejected game operations. All are recoverable no-ops.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Target cell is occupied or off the board
    #[error("Illegal move at {0}")]
    IllegalMove(Position),

    /// The game has already ended
    #[error("Game is over")]
    GameOver,

    #[error("Nothing to undo")]
    NothingToUndo,

    /// A human tried to play while the connected AI is on move
    #[error("Waiting for the AI to move")]
    NotYourTurn,
}

/// Transport-level failures of the AI bridge. Never fatal.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Connection lost: {0}")]
    ConnectionLost(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Malformed message: {0}")]
    MalformedMessage(String),
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Failed to write record to {path}: {source}")]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No moves to record")]
    Empty,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported think time {0}s")]
    ThinkTime(u32),

    /// Outside `1..=26`
    #[error("Unsupported board size {0}")]
    BoardSize(usize),
}
