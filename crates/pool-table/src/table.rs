use pool_rules::{Placement, SettleObserver, Shot, TableContact};

/// What a runner needs from a table simulation: settle polling plus a way to
/// move bodies, apply shots and step forward one fixed tick.
pub trait Table: SettleObserver {
    /// Teleport a ball and zero its velocity.
    fn apply_placement(&mut self, placement: &Placement);

    /// Launch a ball.
    fn apply_shot(&mut self, shot: &Shot);

    /// Advance one fixed step and report the pocket and floor contacts it produced.
    fn step(&mut self) -> Vec<TableContact>;
}
