use std::fmt;

/// Stone color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black, // moves first
    White,
}

impl Default for Color {
    fn default() -> Self {
        Color::Black
    }
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Single-letter tag used in the move ledger.
    pub fn tag(self) -> char {
        match self {
            Color::Black => 'B',
            Color::White => 'W',
        }
    }

    pub fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Color::Black => write!(f, "BLACK"),
            Color::White => write!(f, "WHITE"),
        }
    }
}

/// Cell contents. Kept apart from `Color` so "empty" is never a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellState {
    #[default]
    Empty,
    Black,
    White,
}

impl CellState {
    pub fn stone(self) -> Option<Color> {
        match self {
            CellState::Empty => None,
            CellState::Black => Some(Color::Black),
            CellState::White => Some(Color::White),
        }
    }

    pub fn is_empty(self) -> bool {
        self == CellState::Empty
    }
}

impl From<Color> for CellState {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => CellState::Black,
            Color::White => CellState::White,
        }
    }
}

/// Board coordinate (0-indexed, row 0 is the far edge)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Ledger notation: column letter from 'A', row number counted from the far edge.
    pub fn notation(&self, board_size: usize) -> String {
        let col_letter = (b'A' + self.col as u8) as char;
        format!("{}{}", col_letter, board_size - self.row)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
