use crate::config::{GameConfig, ThinkTime};
use crate::core::{Color, Position};
use crate::error::{GameError, RecordError};
use crate::game::{Game, GameStatus, MoveOutcome, TerminationReason};
use crate::logic::empty_cells;
use crate::network::{AiReply, BridgeEvent, BridgeHandle, MoveRequest};
use crate::record;
use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

/// Events drained by the session, one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Tick,
    Bridge(BridgeEvent),
    /// Deferred random move after the AI declined
    RandomMove(Position),
}

/// The single authority over the game.
///
/// Human input, clock ticks and AI replies all reach the `Game` through here,
/// so they are applied strictly one after another.
pub struct Session {
    game: Game,
    think_time: ThinkTime,
    ai_connected: bool,
    bridge: Option<BridgeHandle>,
    events: mpsc::Sender<SessionEvent>,
    record_dir: PathBuf,
    record_path: PathBuf,
    random_move_delay: Duration,
    status_msg: Option<String>,
}

impl Session {
    pub fn new(
        config: &GameConfig,
        bridge: Option<BridgeHandle>,
        events: mpsc::Sender<SessionEvent>,
    ) -> Self {
        let game = Game::new(
            config.board_size,
            config.clock_budget(),
            config.ai_side.color(),
        );
        let record_path = record::record_path(&config.record_dir, &game);
        Session {
            game,
            think_time: config.think_time,
            ai_connected: false,
            bridge,
            events,
            record_dir: config.record_dir.clone(),
            record_path,
            random_move_delay: config.random_move_delay(),
            status_msg: None,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn think_time(&self) -> ThinkTime {
        self.think_time
    }

    pub fn ai_connected(&self) -> bool {
        self.ai_connected
    }

    pub fn status_msg(&self) -> Option<&str> {
        self.status_msg.as_deref()
    }

    pub fn record_path(&self) -> &Path {
        &self.record_path
    }

    /// Human move. While the AI is connected and on move, humans wait.
    pub fn play(&mut self, pos: Position) -> Result<MoveOutcome, GameError> {
        if self.game.is_terminal() {
            return Err(GameError::GameOver);
        }
        if self.ai_connected && self.game.is_ai_turn() {
            return Err(GameError::NotYourTurn);
        }
        let outcome = self.game.apply_move(pos)?;
        self.after_change(outcome);
        Ok(outcome)
    }

    /// A side already out of time cannot undo; that ends the game instead.
    pub fn undo(&mut self) -> Result<(), GameError> {
        let was_running = !self.game.is_terminal();
        if let Err(e) = self.game.undo() {
            if let (true, GameStatus::Terminated { reason, winner }) =
                (was_running, self.game.status())
            {
                self.after_change(MoveOutcome::GameEnded { winner, reason });
            }
            return Err(e);
        }
        self.status_msg = None;
        self.request_ai_move();
        Ok(())
    }

    pub fn new_game(&mut self, ai_color: Option<Color>) {
        self.game.new_game(ai_color);
        self.record_path = record::record_path(&self.record_dir, &self.game);
        self.status_msg = None;
        tracing::info!("new game, AI plays {:?}", ai_color);
        self.request_ai_move();
    }

    pub fn set_think_time(&mut self, think_time: ThinkTime) {
        self.think_time = think_time;
    }

    /// Saves the ledger for the current game, finished or not.
    pub fn save_record(&self) -> Result<PathBuf, RecordError> {
        record::save_game(&self.game, &self.record_path)?;
        Ok(self.record_path.clone())
    }

    pub fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Tick => {
                if let Some(outcome) = self.game.tick() {
                    self.after_change(outcome);
                }
            }
            SessionEvent::Bridge(event) => self.on_bridge(event),
            SessionEvent::RandomMove(pos) => self.on_ai_candidate(pos),
        }
    }

    fn on_bridge(&mut self, event: BridgeEvent) {
        match event {
            BridgeEvent::Connected => {
                self.ai_connected = true;
                self.request_ai_move();
            }
            BridgeEvent::Disconnected => {
                self.ai_connected = false;
            }
            BridgeEvent::Reply(AiReply::Play(pos)) => self.on_ai_candidate(pos),
            BridgeEvent::Reply(AiReply::Decline) => self.schedule_random_move(),
        }
    }

    fn on_ai_candidate(&mut self, pos: Position) {
        if !self.ai_connected {
            tracing::debug!("AI offline, dropping candidate {}", pos);
            return;
        }
        if let Some(outcome) = self.game.apply_ai_move(pos) {
            self.after_change(outcome);
        }
    }

    /// The AI declined: pick a uniformly random empty cell and post it back
    /// to ourselves after a short pause. It is re-validated on arrival.
    fn schedule_random_move(&mut self) {
        if self.game.is_terminal() || !self.game.is_ai_turn() {
            return;
        }
        let cells = empty_cells(self.game.board());
        let Some(&pos) = cells.choose(&mut rand::thread_rng()) else {
            return;
        };
        tracing::info!("AI declined, random move at {}", pos);
        let tx = self.events.clone();
        let delay = self.random_move_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(SessionEvent::RandomMove(pos)).await;
        });
    }

    fn after_change(&mut self, outcome: MoveOutcome) {
        match outcome {
            MoveOutcome::Continued => {
                match self.save_record() {
                    Ok(_) | Err(RecordError::Empty) => {}
                    Err(e) => tracing::warn!("autosave failed: {}", e),
                }
                self.request_ai_move();
            }
            MoveOutcome::GameEnded { winner, reason } => {
                let why = match reason {
                    TerminationReason::Liberty => "no liberty",
                    TerminationReason::Timeout => "timeout",
                };
                self.status_msg = Some(match self.save_record() {
                    Ok(path) => format!("{} wins ({}). Saved {}", winner, why, path.display()),
                    Err(e) => {
                        tracing::warn!("autosave failed: {}", e);
                        format!("{} wins ({}). {}", winner, why, e)
                    }
                });
            }
        }
    }

    /// Sends the board to the AI when it is its turn and it can answer.
    fn request_ai_move(&mut self) {
        if !self.ai_connected || self.game.is_terminal() || !self.game.is_ai_turn() {
            return;
        }
        if let Some(bridge) = &self.bridge {
            bridge.request(MoveRequest::new(self.game.board(), self.think_time));
        }
    }
}
