use crate::config::ThinkTime;
use crate::core::{Board, CellState, Position};
use crate::error::BridgeError;
use serde::{Deserialize, Serialize};

/// The `[-1, -1]` reply: the AI offers no move.
pub const DECLINE: [i64; 2] = [-1, -1];

/// Client -> server: board snapshot and think-time budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub board: Vec<Vec<CellState>>,
    pub time: String,
}

impl MoveRequest {
    pub fn new(board: &Board, think_time: ThinkTime) -> Self {
        MoveRequest {
            board: board.rows(),
            time: think_time.wire(),
        }
    }
}

/// Server -> client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiReply {
    Play(Position),
    Decline,
}

/// Parses a `[row, col]` reply. Anything else, including coordinates off a
/// `board_size` board, is malformed.
pub fn parse_reply(text: &str, board_size: usize) -> Result<AiReply, BridgeError> {
    let pair: [i64; 2] = serde_json::from_str(text)
        .map_err(|e| BridgeError::MalformedMessage(format!("{}: {}", e, text)))?;

    if pair == DECLINE {
        return Ok(AiReply::Decline);
    }

    let [row, col] = pair;
    let on_board = |v: i64| v >= 0 && (v as u64) < board_size as u64;
    if on_board(row) && on_board(col) {
        Ok(AiReply::Play(Position::new(row as usize, col as usize)))
    } else {
        Err(BridgeError::MalformedMessage(format!(
            "coordinates off the board: {}",
            text
        )))
    }
}
