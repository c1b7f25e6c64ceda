use std::collections::BTreeSet;

use crate::api::types::BallId;

/// Per-round accumulators filled by physics notifications between
/// resolution passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundState {
    pocketed: BTreeSet<BallId>,
    hit_out: BTreeSet<BallId>,
    balls_in_motion: u32,
}

impl RoundState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a ball entering a pocket. Duplicates are ignored.
    /// A pocketed ball is never also hit-out, so it is evicted from that set.
    pub fn record_pocketed(&mut self, ball: BallId) -> bool {
        self.hit_out.remove(&ball);
        self.pocketed.insert(ball)
    }

    /// Record a ball reaching the floor, unless it is already recorded in
    /// either set.
    pub fn record_hit_out(&mut self, ball: BallId) -> bool {
        if self.pocketed.contains(&ball) {
            return false;
        }
        self.hit_out.insert(ball)
    }

    /// One more ball is in flight.
    pub fn ball_struck(&mut self) -> u32 {
        self.balls_in_motion += 1;
        self.balls_in_motion
    }

    /// One ball came to rest. Returns true only when this settle brought the
    /// in-flight count to exactly zero.
    pub fn ball_settled(&mut self) -> bool {
        if self.balls_in_motion == 0 {
            return false;
        }
        self.balls_in_motion -= 1;
        self.balls_in_motion == 0
    }

    pub fn reset_motion(&mut self) {
        self.balls_in_motion = 0;
    }

    pub fn remove_pocketed(&mut self, ball: BallId) -> bool {
        self.pocketed.remove(&ball)
    }

    pub fn clear_hit_out(&mut self) {
        self.hit_out.clear();
    }

    /// Forget everything; used at the start of a new game.
    pub fn clear(&mut self) {
        self.pocketed.clear();
        self.hit_out.clear();
        self.balls_in_motion = 0;
    }

    pub fn pocketed(&self) -> &BTreeSet<BallId> {
        &self.pocketed
    }

    pub fn hit_out(&self) -> &BTreeSet<BallId> {
        &self.hit_out
    }

    pub fn balls_in_motion(&self) -> u32 {
        self.balls_in_motion
    }

    pub fn is_pocketed(&self, ball: BallId) -> bool {
        self.pocketed.contains(&ball)
    }
}
