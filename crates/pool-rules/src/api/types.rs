use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::ConfigError;

/// Unique identifier for a ball on the table. The value is the ball number;
/// the cue ball is always number 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BallId(pub u8);

impl BallId {
    /// The single ball force is applied to.
    pub const CUE: BallId = BallId(0);

    pub fn is_cue(self) -> bool {
        self == Self::CUE
    }
}

impl fmt::Display for BallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_cue() {
            write!(f, "cue")
        } else {
            write!(f, "ball {}", self.0)
        }
    }
}

/// Session-level game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// Free shooting with the cue ball only, no turns or scores.
    Practice,
    /// Waiting out the setup delay before play begins or resumes.
    GetSet,
    Play,
    Pause,
    Complete,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameState::Practice => "practice",
            GameState::GetSet => "get-set",
            GameState::Play => "play",
            GameState::Pause => "pause",
            GameState::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Selected game variant. The ordinal is the number of object balls racked,
/// which is also the number that must be pocketed to finish the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GameType {
    JustCue = 1,
    ThreeBall = 3,
    SixBall = 6,
    SevenBall = 7,
}

impl GameType {
    /// Total object balls racked for this game type.
    pub fn object_balls(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for GameType {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(GameType::JustCue),
            3 => Ok(GameType::ThreeBall),
            6 => Ok(GameType::SixBall),
            7 => Ok(GameType::SevenBall),
            other => Err(ConfigError::UnknownGameType(other)),
        }
    }
}

impl From<GameType> for u8 {
    fn from(game_type: GameType) -> Self {
        game_type as u8
    }
}
