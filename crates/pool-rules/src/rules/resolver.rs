//! Turn resolution: who scores, who shoots next, and whether the game is over.
//!
//! [`TurnResolver::resolve`] reads the round accumulators and the player
//! rotation and returns a [`TurnOutcome`] without mutating anything. The
//! session commits the outcome afterwards, so a pass is either fully applied
//! or not at all.

use crate::api::types::BallId;
use super::balls::BallSet;
use super::players::{apply_delta, PlayerQueue};
use super::round::RoundState;

/// Score penalty for pocketing the cue ball.
pub const FOUL_PENALTY: i32 = -1;

/// Which branch of the rules a pass took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnVerdict {
    /// The active player never struck a ball; nothing is scored.
    NoStrike,
    /// The cue ball was pocketed.
    Foul,
    /// New object balls were pocketed; the player shoots again.
    Scored(u32),
    /// Nothing new was pocketed.
    Miss,
}

/// Everything a resolution pass decided, ready to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub verdict: TurnVerdict,
    /// Signed change to the active player's score.
    pub score_delta: i32,
    /// The active player's score once `score_delta` is applied.
    pub projected_score: u32,
    /// Balls to flag as resolved so they are never scored again.
    pub resolved: Vec<BallId>,
    /// Balls to return to their home position (hit-outs, plus the cue on a foul).
    pub replace: Vec<BallId>,
    /// Whether the cue ball comes out of the pocketed set.
    pub remove_cue: bool,
    /// Whether the turn passes to the next player.
    pub advance: bool,
    /// Winners if this pass completes the game.
    pub winners: Option<Vec<String>>,
}

impl TurnOutcome {
    pub fn is_complete(&self) -> bool {
        self.winners.is_some()
    }
}

/// Scoring and turn-transition engine for one game type.
#[derive(Debug, Clone, Copy)]
pub struct TurnResolver {
    total_object_balls: usize,
}

impl TurnResolver {
    pub fn new(total_object_balls: usize) -> Self {
        Self { total_object_balls }
    }

    pub fn total_object_balls(&self) -> usize {
        self.total_object_balls
    }

    /// Decide the outcome of the turn that just settled.
    pub fn resolve(&self, round: &RoundState, players: &PlayerQueue, balls: &BallSet) -> TurnOutcome {
        debug_assert!(!players.is_empty(), "resolving a turn with no players");
        debug_assert!(
            round.pocketed().is_disjoint(round.hit_out()),
            "ball recorded as both pocketed and hit out"
        );

        let active = players.active();
        let mut outcome = TurnOutcome {
            verdict: TurnVerdict::NoStrike,
            score_delta: 0,
            projected_score: active.score(),
            resolved: Vec::new(),
            replace: Vec::new(),
            remove_cue: false,
            advance: false,
            winners: None,
        };
        // The cue ball never counts toward completion.
        let pocketed_count = round.pocketed().iter().filter(|b| !b.is_cue()).count();

        if active.has_struck_this_turn() {
            if round.is_pocketed(BallId::CUE) {
                // Other balls sunk with the cue are owned by nobody: flagged, never scored.
                outcome.verdict = TurnVerdict::Foul;
                outcome.score_delta = FOUL_PENALTY;
                outcome.remove_cue = true;
                outcome.resolved = round.pocketed().iter().copied().filter(|b| !b.is_cue()).collect();
                outcome.replace.push(BallId::CUE);
                outcome.advance = true;
            } else {
                let newly = round
                    .pocketed()
                    .iter()
                    .filter(|id| balls.get(**id).is_some_and(|b| !b.pocketed_this_turn))
                    .count() as u32;
                if newly > 0 {
                    outcome.verdict = TurnVerdict::Scored(newly);
                    outcome.score_delta = newly as i32;
                    outcome.resolved = round.pocketed().iter().copied().collect();
                } else {
                    outcome.verdict = TurnVerdict::Miss;
                    outcome.advance = true;
                }
            }
            outcome.replace.extend(round.hit_out().iter().copied());
            outcome.projected_score = apply_delta(active.score(), outcome.score_delta);
        }

        if pocketed_count == self.total_object_balls {
            outcome.winners = Some(self.winners(players, outcome.projected_score));
        }
        outcome
    }

    /// Every player holding the top score once the active player's projected
    /// score is counted. Ties produce several winners.
    fn winners(&self, players: &PlayerQueue, projected_active: u32) -> Vec<String> {
        let scores: Vec<(&str, u32)> = players
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name(), if i == 0 { projected_active } else { p.score() }))
            .collect();
        let best = scores.iter().map(|(_, s)| *s).max().unwrap_or(0);
        scores
            .into_iter()
            .filter(|(_, s)| *s == best)
            .map(|(name, _)| name.to_string())
            .collect()
    }
}
