pub mod clock;

pub use clock::{Clock, Ticker, Timeout};

use crate::core::{Board, CellState, Color, Move, Position};
use crate::error::GameError;
use crate::logic::{check_terminal, is_legal};
use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// A group was left without a liberty by the last move
    Liberty,
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Terminated {
        reason: TerminationReason,
        winner: Color,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Continued,
    GameEnded {
        winner: Color,
        reason: TerminationReason,
    },
}

/// Turn controller and single owner of the game state.
///
/// `board` is always the replay of `history`. `to_move` alternates with the
/// history length, except that the turn does not advance past a losing move.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    to_move: Color,
    history: Vec<Move>,
    status: GameStatus,
    clock: Clock,
    ai_color: Option<Color>,
    started_at: DateTime<Local>,
}

impl Game {
    pub fn new(board_size: usize, clock_budget: Duration, ai_color: Option<Color>) -> Self {
        Self::start_at(board_size, clock_budget, ai_color, Instant::now())
    }

    /// Fresh game with black's clock running from `now`.
    pub fn start_at(
        board_size: usize,
        clock_budget: Duration,
        ai_color: Option<Color>,
        now: Instant,
    ) -> Self {
        let mut clock = Clock::new(clock_budget);
        clock.start_at(Color::Black, now);
        Game {
            board: Board::new(board_size),
            to_move: Color::Black,
            history: Vec::new(),
            status: GameStatus::InProgress,
            clock,
            ai_color,
            started_at: Local::now(),
        }
    }

    pub fn new_game(&mut self, ai_color: Option<Color>) {
        self.new_game_at(ai_color, Instant::now());
    }

    /// Replaces the whole game, including a terminated one.
    pub fn new_game_at(&mut self, ai_color: Option<Color>, now: Instant) {
        self.board.clear();
        self.history.clear();
        self.to_move = Color::Black;
        self.status = GameStatus::InProgress;
        self.ai_color = ai_color;
        self.started_at = Local::now();
        self.clock.reset();
        self.clock.start_at(Color::Black, now);
    }

    pub fn apply_move(&mut self, pos: Position) -> Result<MoveOutcome, GameError> {
        self.apply_move_at(pos, Instant::now())
    }

    /// Plays a stone for the side to move.
    ///
    /// If the mover's clock is found empty when it is stopped, the timeout
    /// wins: the stone is not placed and the game ends on time.
    pub fn apply_move_at(&mut self, pos: Position, now: Instant) -> Result<MoveOutcome, GameError> {
        if self.is_terminal() {
            return Err(GameError::GameOver);
        }
        if !is_legal(&self.board, pos) {
            return Err(GameError::IllegalMove(pos));
        }

        let mover = self.to_move;
        self.clock.stop_at(now);
        if self.clock.remaining(mover) <= 0.0 {
            return Ok(self.terminate(TerminationReason::Timeout, mover.opponent()));
        }

        self.board.set(pos, CellState::from(mover));
        self.history
            .push(Move::new(pos, mover, self.history.len() + 1));

        if let Some(winner) = check_terminal(&self.board, mover) {
            return Ok(self.terminate(TerminationReason::Liberty, winner));
        }

        self.to_move = mover.opponent();
        self.clock.start_at(self.to_move, now);
        Ok(MoveOutcome::Continued)
    }

    pub fn undo(&mut self) -> Result<(), GameError> {
        self.undo_at(Instant::now())
    }

    /// Takes back the last move. Only valid while the game is in progress.
    ///
    /// A terminated game reports `GameOver` rather than `NothingToUndo`. If the
    /// side to move has run out of time, the timeout is declared instead and
    /// the move stays on the board.
    pub fn undo_at(&mut self, now: Instant) -> Result<(), GameError> {
        if self.is_terminal() {
            return Err(GameError::GameOver);
        }
        if self.history.is_empty() {
            return Err(GameError::NothingToUndo);
        }

        let flagged = self.to_move;
        self.clock.stop_at(now);
        if self.clock.remaining(flagged) <= 0.0 {
            self.terminate(TerminationReason::Timeout, flagged.opponent());
            return Err(GameError::GameOver);
        }

        if let Some(last) = self.history.pop() {
            self.board.set(last.pos, CellState::Empty);
            self.to_move = last.color;
        }
        self.clock.start_at(self.to_move, now);
        Ok(())
    }

    pub fn tick(&mut self) -> Option<MoveOutcome> {
        self.tick_at(Instant::now())
    }

    /// Clock tick. Ends the game on time without requiring a further move.
    pub fn tick_at(&mut self, now: Instant) -> Option<MoveOutcome> {
        if self.is_terminal() {
            return None;
        }
        let Timeout(flagged) = self.clock.tick_at(now)?;
        Some(self.terminate(TerminationReason::Timeout, flagged.opponent()))
    }

    /// Would an AI candidate at `pos` still be acceptable right now?
    pub fn accepts_ai_move(&self, pos: Position) -> bool {
        !self.is_terminal() && self.is_ai_turn() && is_legal(&self.board, pos)
    }

    pub fn apply_ai_move(&mut self, pos: Position) -> Option<MoveOutcome> {
        self.apply_ai_move_at(pos, Instant::now())
    }

    /// Applies an AI candidate after re-validating it; stale candidates are
    /// dropped without touching the game.
    pub fn apply_ai_move_at(&mut self, pos: Position, now: Instant) -> Option<MoveOutcome> {
        if !self.accepts_ai_move(pos) {
            tracing::debug!("discarding stale AI move {}", pos);
            return None;
        }
        self.apply_move_at(pos, now).ok()
    }

    /// Callers have already stopped the clock.
    fn terminate(&mut self, reason: TerminationReason, winner: Color) -> MoveOutcome {
        self.status = GameStatus::Terminated { reason, winner };
        tracing::info!("game over: {} wins ({:?})", winner, reason);
        MoveOutcome::GameEnded { winner, reason }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.history.last()
    }

    pub fn move_count(&self) -> usize {
        self.history.len()
    }

    /// Sequence number of the stone on `pos`, if any.
    pub fn move_number_at(&self, pos: Position) -> Option<usize> {
        self.history.iter().find(|m| m.pos == pos).map(|m| m.seq)
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, GameStatus::Terminated { .. })
    }

    pub fn winner(&self) -> Option<Color> {
        match self.status {
            GameStatus::Terminated { winner, .. } => Some(winner),
            GameStatus::InProgress => None,
        }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn ai_color(&self) -> Option<Color> {
        self.ai_color
    }

    pub fn is_ai_turn(&self) -> bool {
        self.ai_color == Some(self.to_move)
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUDGET: Duration = Duration::from_secs(900);

    fn game_at(t0: Instant, ai: Option<Color>) -> Game {
        Game::start_at(9, BUDGET, ai, t0)
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_fresh_game() {
        let game = game_at(Instant::now(), None);
        assert_eq!(game.to_move(), Color::Black);
        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.clock().running(), Some(Color::Black));
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_apply_then_undo_restores_state() {
        let t0 = Instant::now();
        let mut game = game_at(t0, None);
        game.apply_move_at(Position::new(4, 4), t0).unwrap();
        let board = game.board().clone();
        let history = game.history().to_vec();
        let to_move = game.to_move();
        let black = game.clock().remaining(Color::Black);
        let white = game.clock().remaining(Color::White);

        assert_eq!(
            game.apply_move_at(Position::new(2, 6), t0),
            Ok(MoveOutcome::Continued)
        );
        game.undo_at(t0).unwrap();

        assert_eq!(game.board(), &board);
        assert_eq!(game.history(), history.as_slice());
        assert_eq!(game.to_move(), to_move);
        assert_eq!(game.clock().remaining(Color::Black), black);
        assert_eq!(game.clock().remaining(Color::White), white);
        assert_eq!(game.clock().running(), Some(to_move));
    }

    #[test]
    fn test_sequence_indices_stay_contiguous() {
        let t0 = Instant::now();
        let mut game = game_at(t0, None);
        let cells = [(0, 4), (8, 4), (4, 0), (4, 8), (2, 2), (6, 6)];
        for &(r, c) in &cells[..4] {
            game.apply_move_at(Position::new(r, c), t0).unwrap();
        }
        game.undo_at(t0).unwrap();
        game.undo_at(t0).unwrap();
        for &(r, c) in &cells[4..] {
            game.apply_move_at(Position::new(r, c), t0).unwrap();
        }

        let seqs: Vec<usize> = game.history().iter().map(|m| m.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4]);
        assert_eq!(game.move_number_at(Position::new(6, 6)), Some(4));
        assert_eq!(game.move_number_at(Position::new(4, 8)), None);
        assert_eq!(game.to_move(), Color::Black);
    }

    #[test]
    fn test_illegal_and_out_of_bounds_moves_are_noops() {
        let t0 = Instant::now();
        let mut game = game_at(t0, None);
        game.apply_move_at(Position::new(3, 3), t0).unwrap();

        assert_eq!(
            game.apply_move_at(Position::new(3, 3), t0),
            Err(GameError::IllegalMove(Position::new(3, 3)))
        );
        assert_eq!(
            game.apply_move_at(Position::new(9, 1), t0),
            Err(GameError::IllegalMove(Position::new(9, 1)))
        );
        assert_eq!(game.move_count(), 1);
        assert_eq!(game.to_move(), Color::White);
    }

    #[test]
    fn test_nothing_to_undo() {
        let mut game = game_at(Instant::now(), None);
        assert_eq!(game.undo(), Err(GameError::NothingToUndo));
    }

    /// Black fills its own last liberty in the corner.
    #[test]
    fn test_self_suffocation_ends_game_for_mover() {
        let t0 = Instant::now();
        let mut game = game_at(t0, None);
        for (r, c) in [(5, 5), (0, 1), (6, 6), (1, 0)] {
            game.apply_move_at(Position::new(r, c), t0).unwrap();
        }
        let outcome = game.apply_move_at(Position::new(0, 0), t0).unwrap();

        assert_eq!(
            outcome,
            MoveOutcome::GameEnded {
                winner: Color::White,
                reason: TerminationReason::Liberty
            }
        );
        assert_eq!(game.move_count(), 5);
        assert_eq!(game.last_move().map(|m| m.color), Some(Color::Black));
        assert_eq!(game.to_move(), Color::Black);
        assert_eq!(game.clock().running(), None);
    }

    /// Black takes the last liberty of a white corner stone: black loses.
    #[test]
    fn test_suffocating_opponent_ends_game_for_mover() {
        let t0 = Instant::now();
        let mut game = game_at(t0, None);
        for (r, c) in [(0, 1), (0, 0), (5, 5)] {
            game.apply_move_at(Position::new(r, c), t0).unwrap();
        }
        game.apply_move_at(Position::new(6, 6), t0).unwrap();
        let outcome = game.apply_move_at(Position::new(1, 0), t0).unwrap();

        assert_eq!(game.winner(), Some(Color::White));
        assert!(matches!(
            outcome,
            MoveOutcome::GameEnded {
                reason: TerminationReason::Liberty,
                ..
            }
        ));
    }

    #[test]
    fn test_terminal_game_rejects_mutation() {
        let t0 = Instant::now();
        let mut game = game_at(t0, None);
        for (r, c) in [(5, 5), (0, 1), (6, 6), (1, 0), (0, 0)] {
            game.apply_move_at(Position::new(r, c), t0).unwrap();
        }
        assert_eq!(
            game.apply_move_at(Position::new(8, 8), t0),
            Err(GameError::GameOver)
        );
        assert_eq!(game.undo_at(t0), Err(GameError::GameOver));
        assert_eq!(game.move_count(), 5);
    }

    #[test]
    fn test_tick_timeout_terminates() {
        let t0 = Instant::now();
        let mut game = Game::start_at(9, secs(3), None, t0);
        assert_eq!(game.tick_at(t0 + secs(1)), None);
        assert_eq!(
            game.tick_at(t0 + secs(3)),
            Some(MoveOutcome::GameEnded {
                winner: Color::White,
                reason: TerminationReason::Timeout
            })
        );
        assert!(game.is_terminal());
        assert_eq!(game.tick_at(t0 + secs(4)), None);
    }

    #[test]
    fn test_timeout_takes_precedence_over_late_move() {
        let t0 = Instant::now();
        let mut game = Game::start_at(9, secs(10), None, t0);
        let outcome = game.apply_move_at(Position::new(4, 4), t0 + secs(11)).unwrap();

        assert_eq!(
            outcome,
            MoveOutcome::GameEnded {
                winner: Color::White,
                reason: TerminationReason::Timeout
            }
        );
        assert!(game.history().is_empty());
        assert_eq!(game.board().get(Position::new(4, 4)), Some(CellState::Empty));
    }

    #[test]
    fn test_undo_cannot_escape_timeout() {
        let t0 = Instant::now();
        let mut game = Game::start_at(9, secs(10), None, t0);
        game.apply_move_at(Position::new(4, 4), t0).unwrap();

        assert_eq!(game.undo_at(t0 + secs(11)), Err(GameError::GameOver));
        assert_eq!(
            game.status(),
            GameStatus::Terminated {
                reason: TerminationReason::Timeout,
                winner: Color::Black
            }
        );
        assert_eq!(game.move_count(), 1);
        assert_eq!(game.to_move(), Color::White);
        assert_eq!(game.clock().remaining(Color::White), 0.0);
    }

    #[test]
    fn test_clock_switches_sides() {
        let t0 = Instant::now();
        let mut game = game_at(t0, None);
        game.apply_move_at(Position::new(4, 4), t0 + secs(5)).unwrap();
        assert_eq!(game.clock().running(), Some(Color::White));
        game.apply_move_at(Position::new(4, 5), t0 + secs(7)).unwrap();

        assert_eq!(game.clock().remaining(Color::Black), 895.0);
        assert_eq!(game.clock().remaining(Color::White), 898.0);
    }

    #[test]
    fn test_stale_ai_candidates_are_discarded() {
        let t0 = Instant::now();
        let mut game = game_at(t0, Some(Color::White));

        // Black to move: not the AI's turn.
        assert_eq!(game.apply_ai_move_at(Position::new(0, 0), t0), None);
        assert!(game.history().is_empty());

        game.apply_move_at(Position::new(4, 4), t0).unwrap();
        // Occupied target.
        assert_eq!(game.apply_ai_move_at(Position::new(4, 4), t0), None);
        assert_eq!(
            game.apply_ai_move_at(Position::new(2, 2), t0),
            Some(MoveOutcome::Continued)
        );
        assert_eq!(game.move_count(), 2);
    }

    #[test]
    fn test_ai_candidate_after_game_over_is_discarded() {
        let t0 = Instant::now();
        let mut game = Game::start_at(9, secs(1), Some(Color::White), t0);
        game.apply_move_at(Position::new(4, 4), t0).unwrap();
        game.tick_at(t0 + secs(2));
        assert!(game.is_terminal());

        assert_eq!(game.apply_ai_move_at(Position::new(0, 0), t0 + secs(2)), None);
        assert_eq!(game.move_count(), 1);
    }

    #[test]
    fn test_two_human_mode_never_accepts_ai_moves() {
        let t0 = Instant::now();
        let game = game_at(t0, None);
        assert!(!game.accepts_ai_move(Position::new(0, 0)));
    }

    #[test]
    fn test_new_game_resets_everything() {
        let t0 = Instant::now();
        let mut game = Game::start_at(9, secs(1), None, t0);
        game.apply_move_at(Position::new(4, 4), t0).unwrap();
        game.tick_at(t0 + secs(5));
        assert!(game.is_terminal());

        game.new_game_at(Some(Color::Black), t0 + secs(6));
        assert_eq!(game.status(), GameStatus::InProgress);
        assert!(game.history().is_empty());
        assert_eq!(game.board().get(Position::new(4, 4)), Some(CellState::Empty));
        assert_eq!(game.clock().remaining(Color::White), 1.0);
        assert_eq!(game.ai_color(), Some(Color::Black));
        assert!(game.is_ai_turn());
    }
}
