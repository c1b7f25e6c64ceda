//! Per-ball settle detection.
//!
//! Each ball on the table carries a [`ShotTracker`] that is polled once per
//! fixed tick with the physics collaborator's at-rest signal. The tracker
//! turns that level signal into one-shot edges: struck, in flight, settled.

/// Where a ball is in its journey from placement to rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShotPhase {
    /// Repositioned by the rules; waiting for the body to come to rest.
    Placing,
    /// At rest and ready to be struck.
    Default,
    /// Just started moving. Lasts exactly one tick.
    Struck,
    /// Moving and counted as in flight.
    InMotion,
    /// Came to rest after being in flight; waits for the round to be ready.
    Stationary,
}

/// Edge produced by a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShotTransition {
    /// `Placing -> Default`
    Placed,
    /// `Default -> Struck`
    Struck,
    /// `Struck -> InMotion`
    InFlight,
    /// `InMotion -> Stationary`
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotTracker {
    phase: ShotPhase,
}

impl ShotTracker {
    /// A tracker for a ball already resting on the table.
    pub fn new() -> Self {
        Self {
            phase: ShotPhase::Default,
        }
    }

    pub fn phase(&self) -> ShotPhase {
        self.phase
    }

    /// Advance on this tick's at-rest signal.
    ///
    /// Repeated polls while the level does not change produce nothing, so a
    /// body resting for many ticks settles exactly once.
    pub fn poll(&mut self, at_rest: bool) -> Option<ShotTransition> {
        let (next, transition) = match (self.phase, at_rest) {
            (ShotPhase::Placing, true) => (ShotPhase::Default, ShotTransition::Placed),
            (ShotPhase::Default, false) => (ShotPhase::Struck, ShotTransition::Struck),
            // unconditional: the ball is now in flight for counting purposes
            (ShotPhase::Struck, _) => (ShotPhase::InMotion, ShotTransition::InFlight),
            (ShotPhase::InMotion, true) => (ShotPhase::Stationary, ShotTransition::Settled),
            _ => return None,
        };
        self.phase = next;
        Some(transition)
    }

    /// The ball was repositioned; wait for it to rest again.
    pub fn place(&mut self) {
        self.phase = ShotPhase::Placing;
    }

    /// Cycle a settled ball back to `Default` once the round is ready.
    /// Returns false for any other phase, which is left untouched.
    pub fn ready(&mut self) -> bool {
        if self.phase == ShotPhase::Stationary {
            self.phase = ShotPhase::Default;
            true
        } else {
            false
        }
    }

    /// Whether the ball is currently counted as moving.
    pub fn in_flight(&self) -> bool {
        matches!(self.phase, ShotPhase::Struck | ShotPhase::InMotion)
    }
}

impl Default for ShotTracker {
    fn default() -> Self {
        Self::new()
    }
}
