// core/tween.rs
//
// Linear value tween used for the cue pull-away after a strike.
//
// Usage:
//   let mut retract = Tween::linear(15.0, 22.5, 1.0);
//   let distance = retract.tick(dt);  // advance and read the current value

/// Linear interpolation between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// A single linear tween over a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    /// Duration in seconds.
    pub duration: f32,
    /// Elapsed time.
    pub elapsed: f32,
}

impl Tween {
    pub fn linear(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
        }
    }

    /// Normalized progress [0, 1].
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Current interpolated value.
    pub fn value(&self) -> f32 {
        lerp(self.from, self.to, self.progress())
    }

    /// Advance by `dt` seconds and return the new value.
    pub fn tick(&mut self, dt: f32) -> f32 {
        self.elapsed += dt;
        self.value()
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }
}
