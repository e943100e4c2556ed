//! Move ledger: `([NG][Trendy][AI][<result>][<YYYY-MM-DD HH:MM>][CCGC];B[E5];W[F5])`

use crate::core::{Color, Move};
use crate::error::RecordError;
use crate::game::{Game, GameStatus};
use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};

const GAME_TAG: &str = "NG";
const NAME_TAG: &str = "Trendy";
const MODE_TAG: &str = "AI";
const TRAILER_TAG: &str = "CCGC";
const SEPARATOR: &str = ";";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Winner(Color),
    Unfinished,
}

impl GameResult {
    /// The winner is stored on the status: the non-timed-out color after a
    /// timeout, the non-mover after a liberty loss.
    pub fn of(status: GameStatus) -> Self {
        match status {
            GameStatus::Terminated { winner, .. } => GameResult::Winner(winner),
            GameStatus::InProgress => GameResult::Unfinished,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GameResult::Winner(color) => write!(f, "{} wins", color),
            GameResult::Unfinished => write!(f, "unfinished"),
        }
    }
}

pub fn serialize(
    history: &[Move],
    result: GameResult,
    timestamp: DateTime<Local>,
    board_size: usize,
) -> String {
    let moves: Vec<String> = history
        .iter()
        .map(|mv| mv.ledger_token(board_size))
        .collect();
    format!(
        "([{}][{}][{}][{}][{}][{}]{}{})",
        GAME_TAG,
        NAME_TAG,
        MODE_TAG,
        result,
        timestamp.format("%Y-%m-%d %H:%M"),
        TRAILER_TAG,
        SEPARATOR,
        moves.join(SEPARATOR)
    )
}

/// Ledger text for the game as it stands.
pub fn serialize_game(game: &Game, timestamp: DateTime<Local>) -> String {
    serialize(
        game.history(),
        GameResult::of(game.status()),
        timestamp,
        game.board().size(),
    )
}

/// Per-game file name, fixed when the game starts.
pub fn record_file_name(started_at: DateTime<Local>) -> String {
    format!("trendy_{}.txt", started_at.format("%Y%m%d_%H%M%S"))
}

pub fn record_path(dir: &Path, game: &Game) -> PathBuf {
    dir.join(record_file_name(game.started_at()))
}

pub fn write_record(path: &Path, text: &str) -> Result<(), RecordError> {
    let persist = |source| RecordError::PersistenceFailure {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(persist)?;
        }
    }
    std::fs::write(path, text).map_err(persist)
}

/// Writes the game's ledger to `path`. Games without moves are not saved.
pub fn save_game(game: &Game, path: &Path) -> Result<(), RecordError> {
    if game.history().is_empty() {
        return Err(RecordError::Empty);
    }
    write_record(path, &serialize_game(game, Local::now()))?;
    tracing::info!("record saved to {}", path.display());
    Ok(())
}
