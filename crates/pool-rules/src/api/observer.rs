use glam::Vec2;

use super::types::BallId;

/// Capability the physics collaborator provides: whether a body has dropped
/// below the sleep threshold. Polled once per fixed tick per tracked ball.
pub trait SettleObserver {
    fn is_at_rest(&self, ball: BallId) -> bool;
}

/// A discrete trigger notification from the physics collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableContact {
    /// The ball entered a pocket region.
    Pocketed(BallId),
    /// The ball crossed the table edge and reached the floor.
    HitOut(BallId),
}

impl TableContact {
    pub fn ball(&self) -> BallId {
        match *self {
            TableContact::Pocketed(ball) | TableContact::HitOut(ball) => ball,
        }
    }
}

/// A repositioning request for the physics collaborator: teleport the body
/// and zero its velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub ball: BallId,
    pub position: Vec2,
}

/// A cue release for the physics collaborator to apply to the cue ball.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub ball: BallId,
    pub velocity: Vec2,
}
