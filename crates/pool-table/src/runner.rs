use pool_rules::{FixedTimestep, GameSession};

use crate::table::Table;

/// Drives a [`GameSession`] against a [`Table`] on a fixed timestep.
///
/// Each fixed step moves any balls the session placed, steps the table,
/// feeds the resulting contacts into the session, and then ticks it so
/// settle detection sees the post-step velocities.
pub struct TableRunner<T: Table> {
    session: GameSession,
    table: T,
    timestep: FixedTimestep,
}

impl<T: Table> TableRunner<T> {
    pub fn new(session: GameSession, table: T) -> Self {
        let timestep = FixedTimestep::new(session.config().timing.fixed_dt);
        let mut runner = Self {
            session,
            table,
            timestep,
        };
        runner.flush_placements();
        runner
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut T {
        &mut self.table
    }

    /// Run as many fixed steps as `dt` of frame time covers. Returns the
    /// number of steps taken.
    pub fn frame(&mut self, dt: f32) -> u32 {
        let steps = self.timestep.accumulate(dt);
        for _ in 0..steps {
            self.step();
        }
        steps
    }

    /// One fixed step.
    pub fn step(&mut self) {
        self.flush_placements();

        let contacts = self.table.step();
        if let Err(e) = self.session.apply_contacts(&contacts) {
            log::warn!("dropping table contacts: {}", e);
        }

        self.session.tick(&self.table);
    }

    /// Release the cue and hand the shot to the table. Returns whether a
    /// shot was actually taken.
    pub fn shoot(&mut self) -> bool {
        match self.session.release_cue() {
            Some(shot) => {
                log::debug!("shot {:?}", shot.velocity);
                self.table.apply_shot(&shot);
                true
            }
            None => false,
        }
    }

    fn flush_placements(&mut self) {
        for placement in self.session.drain_placements() {
            self.table.apply_placement(&placement);
        }
    }
}
