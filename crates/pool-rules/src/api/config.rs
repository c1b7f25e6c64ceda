use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::types::GameType;

/// Errors raised while building a session from configuration.
/// These indicate misconfiguration and surface at setup, never mid-game.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("unknown game type ordinal {0} (expected 1, 3, 6 or 7)")]
    UnknownGameType(u8),
    #[error("at least one player is required")]
    NoPlayers,
    #[error("player names must not be empty")]
    EmptyPlayerName,
    #[error("duplicate player name: {0}")]
    DuplicatePlayer(String),
    #[error("invalid {field}: must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("invalid json: {0}")]
    InvalidJson(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::InvalidJson(e.to_string())
    }
}

/// Timing of the fixed-update cadence and the timed deferrals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Delay between requesting get-set and play actually beginning.
    pub setup_delay_secs: f32,
    /// How long the game-complete banner stays up before returning to practice.
    pub complete_banner_secs: f32,
    /// Duration of the cue pull-away after striking the cue ball.
    pub cue_retract_secs: f32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            setup_delay_secs: 3.0,
            complete_banner_secs: 5.0,
            cue_retract_secs: 1.0,
        }
    }
}

/// Where balls start on the table, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLayout {
    /// Cue ball starting position (left side of table).
    pub cue_start: Vec2,
    /// Rack apex position (right side of table).
    pub rack_apex: Vec2,
    pub ball_radius: f32,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            cue_start: Vec2::new(330.0, 330.0),
            rack_apex: Vec2::new(780.0, 330.0),
            ball_radius: 12.0,
        }
    }
}

/// Cue stick tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CueTuning {
    /// Distance of the cue tip from the cue ball when ready to shoot.
    pub rest_distance: f32,
    /// Furthest the cue can be pulled back beyond its rest distance.
    pub max_pull: f32,
    /// Minimum pull beyond rest distance that counts as a shot on release.
    pub force_threshold: f32,
    /// Shot speed per unit of gathered force.
    pub force_scale: f32,
}

impl Default for CueTuning {
    fn default() -> Self {
        Self {
            rest_distance: 15.0,
            max_pull: 60.0,
            force_threshold: 0.5,
            force_scale: 8.0,
        }
    }
}

/// Everything a session needs at start-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub game_type: GameType,
    /// Player names in turn order. The first player breaks.
    pub players: Vec<String>,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub table: TableLayout,
    #[serde(default)]
    pub cue: CueTuning,
}

impl SessionConfig {
    pub fn new(game_type: GameType, players: &[&str]) -> Self {
        Self {
            game_type,
            players: players.iter().map(|p| p.to_string()).collect(),
            timing: Timing::default(),
            table: TableLayout::default(),
            cue: CueTuning::default(),
        }
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the non-empty and positivity constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players.is_empty() {
            return Err(ConfigError::NoPlayers);
        }
        let mut seen = HashSet::new();
        for name in &self.players {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyPlayerName);
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicatePlayer(name.clone()));
            }
        }

        let positives = [
            ("timing.fixed_dt", self.timing.fixed_dt),
            ("table.ball_radius", self.table.ball_radius),
            ("cue.rest_distance", self.cue.rest_distance),
            ("cue.max_pull", self.cue.max_pull),
        ];
        for (field, value) in positives {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        Ok(())
    }
}
