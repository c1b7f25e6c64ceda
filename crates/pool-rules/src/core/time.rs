/// Fixed timestep accumulator and tick counter.
/// Rule evaluation runs once per fixed tick regardless of frame time; timed
/// deferrals are expressed in whole ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// The fixed delta time per tick.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
    /// Ticks elapsed since creation.
    tick: u64,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            tick: 0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt;
        // Cap to prevent spiral of death (max 10 steps per frame)
        self.accumulator = self.accumulator.min(self.dt * 10.0);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// Advance the tick counter by one fixed step. Returns the new tick.
    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Current tick.
    pub fn now(&self) -> u64 {
        self.tick
    }

    /// Number of whole ticks covering `secs`, rounded up.
    pub fn ticks_for(&self, secs: f32) -> u64 {
        if secs <= 0.0 {
            return 0;
        }
        // Tolerance keeps exact multiples from rounding up an extra tick.
        ((secs / self.dt) - 1e-4).ceil().max(1.0) as u64
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }
}
