use crate::core::{Color, DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "trendy_config.json";

/// Think-time budget sent to the AI with each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ThinkTime(u32);

impl ThinkTime {
    pub const CHOICES: [u32; 6] = [1, 3, 5, 10, 15, 30];

    pub fn secs(self) -> u32 {
        self.0
    }

    /// Next choice, wrapping around. Used by the front-end to cycle settings.
    pub fn next(self) -> ThinkTime {
        let idx = Self::CHOICES.iter().position(|&s| s == self.0).unwrap_or(0);
        ThinkTime(Self::CHOICES[(idx + 1) % Self::CHOICES.len()])
    }

    /// The protocol carries the budget as text.
    pub fn wire(self) -> String {
        self.0.to_string()
    }
}

impl Default for ThinkTime {
    fn default() -> Self {
        ThinkTime(3)
    }
}

impl TryFrom<u32> for ThinkTime {
    type Error = ConfigError;

    fn try_from(secs: u32) -> Result<Self, Self::Error> {
        if Self::CHOICES.contains(&secs) {
            Ok(ThinkTime(secs))
        } else {
            Err(ConfigError::ThinkTime(secs))
        }
    }
}

impl From<ThinkTime> for u32 {
    fn from(t: ThinkTime) -> u32 {
        t.0
    }
}

/// AI side chosen when a game starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiSide {
    Black,
    White,
    None,
}

impl AiSide {
    pub fn color(self) -> Option<Color> {
        match self {
            AiSide::Black => Some(Color::Black),
            AiSide::White => Some(Color::White),
            AiSide::None => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub endpoint: String,
    pub think_time: ThinkTime,
    /// Per-color clock budget
    pub clock_budget_secs: u64,
    pub board_size: usize,
    pub ai_side: AiSide,
    pub reconnect_delay_ms: u64,
    /// Pause before a random fallback move is applied
    pub random_move_delay_ms: u64,
    pub record_dir: PathBuf,
    pub log_file: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            endpoint: "ws://localhost:8080/ws".to_string(),
            think_time: ThinkTime::default(),
            clock_budget_secs: 15 * 60,
            board_size: DEFAULT_BOARD_SIZE,
            ai_side: AiSide::White,
            reconnect_delay_ms: 2000,
            random_move_delay_ms: 500,
            record_dir: PathBuf::from("records"),
            log_file: PathBuf::from("trendy.log"),
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig =
            serde_json::from_str(&config_str).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_BOARD_SIZE).contains(&self.board_size) {
            return Err(ConfigError::BoardSize(self.board_size));
        }
        Ok(())
    }

    /// Missing file means defaults; a present but broken file is logged and ignored.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Read { .. }) => Self::default(),
            Err(e) => {
                tracing::warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    pub fn clock_budget(&self) -> Duration {
        Duration::from_secs(self.clock_budget_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn random_move_delay(&self) -> Duration {
        Duration::from_millis(self.random_move_delay_ms)
    }
}
