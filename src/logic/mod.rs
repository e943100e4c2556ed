use crate::core::{Board, CellState, Color, Position};
use std::collections::HashSet;

/// Does the group containing `pos` touch at least one empty cell?
///
/// Worklist traversal over an immutable board; the visited set keeps looped
/// groups finite. Empty or out-of-bounds starting cells have no group and
/// report `false`.
pub fn has_liberty(board: &Board, pos: Position) -> bool {
    let color = match board.get(pos) {
        Some(CellState::Empty) | None => return false,
        Some(state) => state,
    };

    let mut visited = HashSet::new();
    let mut stack = vec![pos];
    visited.insert(pos);

    while let Some(curr) = stack.pop() {
        for next in board.neighbors(curr) {
            match board.get(next) {
                Some(CellState::Empty) => return true,
                Some(state) if state == color => {
                    if visited.insert(next) {
                        stack.push(next);
                    }
                }
                _ => {}
            }
        }
    }

    false
}

/// A move is legal iff the target is on the board and empty.
///
/// There is no suicide pre-check: a losing placement is still played and the
/// loss is declared afterwards by `check_terminal`.
pub fn is_legal(board: &Board, pos: Position) -> bool {
    board.get(pos) == Some(CellState::Empty)
}

/// Terminal check after `just_moved` placed a stone.
///
/// Returns the winner (always the opponent of `just_moved`) if any
/// `just_moved` group, or any opposing group adjacent to a `just_moved` stone,
/// has no liberty.
pub fn check_terminal(board: &Board, just_moved: Color) -> Option<Color> {
    let mover = CellState::from(just_moved);
    let opponent = CellState::from(just_moved.opponent());

    for pos in board.positions() {
        if board.get(pos) != Some(mover) {
            continue;
        }
        if !has_liberty(board, pos) {
            return Some(just_moved.opponent());
        }
        let suffocated = board
            .neighbors(pos)
            .any(|n| board.get(n) == Some(opponent) && !has_liberty(board, n));
        if suffocated {
            return Some(just_moved.opponent());
        }
    }

    None
}

pub fn empty_cells(board: &Board) -> Vec<Position> {
    board
        .positions()
        .filter(|&pos| board.get(pos) == Some(CellState::Empty))
        .collect()
}
