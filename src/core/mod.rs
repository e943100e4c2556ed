pub mod board;
pub mod r#move;
pub mod serialization;
pub mod types;

pub use board::{Board, DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE};
pub use r#move::Move;
pub use types::{CellState, Color, Position};
