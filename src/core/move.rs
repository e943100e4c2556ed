use super::types::{Color, Position};
use std::fmt;

/// A placed stone. `seq` counts from 1 in play order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub pos: Position,
    pub color: Color,
    pub seq: usize,
}

impl Move {
    pub fn new(pos: Position, color: Color, seq: usize) -> Self {
        Move { pos, color, seq }
    }

    /// Ledger token, e.g. `B[E5]`.
    pub fn ledger_token(&self, board_size: usize) -> String {
        format!("{}[{}]", self.color.tag(), self.pos.notation(board_size))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{} {:?} at {}", self.seq, self.color, self.pos)
    }
}
