use super::types::{CellState, Position};

pub const DEFAULT_BOARD_SIZE: usize = 9;
/// Columns are lettered `A`..`Z`.
pub const MAX_BOARD_SIZE: usize = 26;

const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Board. Pure data; legality lives in `logic` and `game`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<CellState>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Board {
            size,
            cells: vec![CellState::Empty; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn in_bounds(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.size && (col as usize) < self.size
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.size && pos.col < self.size
    }

    pub fn get(&self, pos: Position) -> Option<CellState> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Out-of-bounds writes are ignored.
    pub fn set(&mut self, pos: Position, state: CellState) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = state;
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(CellState::Empty);
    }

    /// In-bounds 4-neighbors of `pos`.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        DIRECTIONS.iter().filter_map(move |&(dr, dc)| {
            let r = pos.row as isize + dr;
            let c = pos.col as isize + dc;
            if self.in_bounds(r, c) {
                Some(Position::new(r as usize, c as usize))
            } else {
                None
            }
        })
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| Position::new(row, col)))
    }

    /// Row-major snapshot, one `Vec` per row.
    pub fn rows(&self) -> Vec<Vec<CellState>> {
        if self.size == 0 {
            return Vec::new();
        }
        self.cells.chunks(self.size).map(|row| row.to_vec()).collect()
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.row * self.size + pos.col)
        } else {
            None
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new(DEFAULT_BOARD_SIZE)
    }
}
