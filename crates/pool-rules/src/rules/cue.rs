use glam::Vec2;

use crate::api::config::CueTuning;
use crate::api::observer::Shot;
use crate::api::types::BallId;
use crate::core::tween::Tween;

/// How far the cue pulls away after a strike, relative to its rest distance.
const RETRACT_FACTOR: f32 = 1.5;

/// The cue stick: aim, force gathering, and the pull-away after a strike.
/// Positions are expressed as the tip's distance from the cue ball along
/// the aim direction; presentation turns that into a transform.
#[derive(Debug, Clone)]
pub struct CueStick {
    tuning: CueTuning,
    aim: Vec2,
    distance: f32,
    /// Set while balls are in flight; pulls and releases are ignored.
    locked: bool,
    retract: Option<Tween>,
}

impl CueStick {
    pub fn new(tuning: CueTuning) -> Self {
        Self {
            tuning,
            aim: Vec2::X,
            distance: tuning.rest_distance,
            locked: false,
            retract: None,
        }
    }

    /// Unit direction the cue ball will travel when struck.
    pub fn aim(&self) -> Vec2 {
        self.aim
    }

    /// Point the cue. Zero-length directions are ignored.
    pub fn set_aim(&mut self, direction: Vec2) {
        let dir = direction.normalize_or_zero();
        if dir != Vec2::ZERO {
            self.aim = dir;
        }
    }

    /// Current tip distance from the cue ball.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Force gathered so far: how far the cue is pulled beyond rest.
    pub fn gathered(&self) -> f32 {
        (self.distance - self.tuning.rest_distance).max(0.0)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Move the cue back (positive) or forward (negative). Moves that would
    /// leave the open range `(rest, rest + max_pull)` are ignored.
    pub fn pull(&mut self, offset: f32) -> bool {
        if self.locked {
            return false;
        }
        let next = self.distance + offset;
        let rest = self.tuning.rest_distance;
        if next > rest && next < rest + self.tuning.max_pull {
            self.distance = next;
            true
        } else {
            false
        }
    }

    /// Let go of the cue. Returns a shot when enough force was gathered.
    pub fn release(&mut self, cue_ball: BallId) -> Option<Shot> {
        if self.locked {
            return None;
        }
        let gathered = self.gathered();
        self.distance = self.tuning.rest_distance;
        if gathered > self.tuning.force_threshold {
            Some(Shot {
                ball: cue_ball,
                velocity: self.aim * gathered * self.tuning.force_scale,
            })
        } else {
            None
        }
    }

    /// The cue ball started moving. Locks the cue and, when `retract_secs`
    /// is given, starts pulling the cue away linearly over that time.
    pub fn on_struck(&mut self, retract_secs: Option<f32>) {
        self.locked = true;
        self.retract = retract_secs.map(|secs| {
            Tween::linear(self.distance, self.tuning.rest_distance * RETRACT_FACTOR, secs)
        });
    }

    /// Advance the retract tween. Returns the new distance while it runs.
    pub fn tick(&mut self, dt: f32) -> Option<f32> {
        let tween = self.retract.as_mut()?;
        self.distance = tween.tick(dt);
        if tween.is_complete() {
            self.retract = None;
        }
        Some(self.distance)
    }

    pub fn is_retracting(&self) -> bool {
        self.retract.is_some()
    }

    /// Everything is at rest: bring the cue back to the ball and unlock.
    pub fn ready(&mut self) {
        self.locked = false;
        self.retract = None;
        self.distance = self.tuning.rest_distance;
    }
}
