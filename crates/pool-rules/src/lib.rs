pub mod api;
pub mod core;
pub mod events;
pub mod rules;
pub mod session;

// Re-export key types at crate root for convenience
pub use api::config::{ConfigError, CueTuning, SessionConfig, TableLayout, Timing};
pub use api::observer::{Placement, SettleObserver, Shot, TableContact};
pub use api::types::{BallId, GameState, GameType};
pub use core::scheduler::{Scheduler, TaskId};
pub use core::time::FixedTimestep;
pub use core::tween::{lerp, Tween};
pub use events::{BallAction, EventBus, EventKind, PoolEvent, SubscriptionId};
pub use rules::balls::{Ball, BallColor, BallDef, BallKind, BallSet, BALLS};
pub use rules::cue::CueStick;
pub use rules::players::{Player, PlayerQueue};
pub use rules::resolver::{TurnOutcome, TurnResolver, TurnVerdict, FOUL_PENALTY};
pub use rules::round::RoundState;
pub use rules::shot::{ShotPhase, ShotTracker, ShotTransition};
pub use session::{GameSession, SessionError};
