use std::collections::BTreeMap;

use glam::Vec2;
use rapier2d::prelude::*;

use pool_rules::{BallId, Placement, SettleObserver, Shot, TableContact};

use crate::table::Table;

// ---------------------------------------------------------------------------
// Conversion helpers (private), glam to nalgebra
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Distance from `point` to the segment `p1..p2`. Used to catch fast balls
/// that would skip over a pocket between two steps.
fn segment_point_distance(p1: Vec2, p2: Vec2, point: Vec2) -> f32 {
    let line = p2 - p1;
    let len_sq = line.length_squared();
    if len_sq < 0.0001 {
        return p1.distance(point);
    }
    let t = ((point - p1).dot(line) / len_sq).clamp(0.0, 1.0);
    (p1 + line * t).distance(point)
}

// ---------------------------------------------------------------------------
// Table geometry and materials
// ---------------------------------------------------------------------------

/// Table dimensions in world units (Y down). The defaults line up with the
/// default `TableLayout` of a session: cue start at (330, 330), rack apex at
/// (780, 330), ball radius 12.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableGeometry {
    /// Top-left corner of the table, rails included.
    pub origin: Vec2,
    pub width: f32,
    pub height: f32,
    /// Cushion thickness; the play area starts this far inside the rails.
    pub cushion: f32,
    /// Gap left in the cushions at each pocket.
    pub pocket_gap: f32,
    pub pocket_radius: f32,
    pub ball_radius: f32,
}

impl Default for TableGeometry {
    fn default() -> Self {
        Self {
            origin: Vec2::new(80.0, 80.0),
            width: 1000.0,
            height: 500.0,
            cushion: 35.0,
            pocket_gap: 40.0,
            pocket_radius: 22.0,
            ball_radius: 12.0,
        }
    }
}

impl TableGeometry {
    /// Play area inside the cushions as (min, max) corners.
    pub fn play_area(&self) -> (Vec2, Vec2) {
        let min = self.origin + Vec2::splat(self.cushion);
        let max = self.origin + Vec2::new(self.width, self.height) - Vec2::splat(self.cushion);
        (min, max)
    }

    /// Four corner pockets then the two side pockets.
    pub fn pocket_positions(&self) -> [Vec2; 6] {
        let corner = self.cushion * 0.7;
        let side = self.cushion * 0.5;
        let Vec2 { x, y } = self.origin;
        let (w, h) = (self.width, self.height);
        [
            Vec2::new(x + corner, y + corner),
            Vec2::new(x + w - corner, y + corner),
            Vec2::new(x + corner, y + h - corner),
            Vec2::new(x + w - corner, y + h - corner),
            Vec2::new(x + w / 2.0, y + side),
            Vec2::new(x + w / 2.0, y + h - side),
        ]
    }

    /// Whether a ball centre has left the play area.
    pub fn is_out_of_bounds(&self, pos: Vec2) -> bool {
        let (min, max) = self.play_area();
        pos.x < min.x || pos.x > max.x || pos.y < min.y || pos.y > max.y
    }
}

/// Physical tuning for the balls and cushions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallMaterial {
    /// Felt friction; higher stops balls faster.
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub restitution: f32,
    pub friction: f32,
    /// Very low so a shot velocity maps directly onto ball speed.
    pub density: f32,
    pub cushion_restitution: f32,
    /// Speed at or below which a ball counts as at rest.
    pub rest_speed: f32,
}

impl Default for BallMaterial {
    fn default() -> Self {
        Self {
            linear_damping: 1.75,
            angular_damping: 1.0,
            restitution: 0.95,
            friction: 0.2,
            density: 0.01,
            cushion_restitution: 0.95,
            rest_speed: 5.0,
        }
    }
}

// ---------------------------------------------------------------------------
// TableWorld
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct BallBody {
    handle: RigidBodyHandle,
    prev_pos: Vec2,
    /// Pocketed or fallen: the body is disabled until the next placement.
    parked: bool,
}

/// A top-down Rapier2D pool table.
///
/// Ball bodies are created lazily the first time a [`Placement`] names them.
/// Each [`TableWorld::step`] reports the balls that dropped into a pocket or
/// left the play area; those balls are parked (disabled) and count as at rest
/// until they are placed again.
pub struct TableWorld {
    geometry: TableGeometry,
    material: BallMaterial,
    gravity: nalgebra::Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    balls: BTreeMap<BallId, BallBody>,
}

impl TableWorld {
    pub fn new(geometry: TableGeometry, material: BallMaterial) -> Self {
        let mut world = Self {
            geometry,
            material,
            gravity: vec2_to_na(Vec2::ZERO),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            balls: BTreeMap::new(),
        };
        world.build_cushions();
        world
    }

    /// Set the integration timestep.
    pub fn set_dt(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
    }

    pub fn geometry(&self) -> &TableGeometry {
        &self.geometry
    }

    /// Six cushion segments leaving gaps at the corner and side pockets.
    fn build_cushions(&mut self) {
        let g = self.geometry;
        let (min, max) = g.play_area();
        let mid_x = g.origin.x + g.width / 2.0;
        let gap = g.pocket_gap;
        let half = g.cushion / 2.0;

        let mut walls: Vec<(Vec2, f32, f32)> = Vec::with_capacity(6);

        // Top and bottom rails, split around the side pockets
        let seg_len = mid_x - min.x - gap - gap / 2.0;
        if seg_len > 0.0 {
            for y in [g.origin.y + half, g.origin.y + g.height - half] {
                walls.push((Vec2::new(min.x + gap + seg_len / 2.0, y), seg_len / 2.0, half));
                walls.push((Vec2::new(max.x - gap - seg_len / 2.0, y), seg_len / 2.0, half));
            }
        }

        // Left and right rails
        let side_len = max.y - min.y - 2.0 * gap;
        if side_len > 0.0 {
            let y = g.origin.y + g.height / 2.0;
            walls.push((Vec2::new(g.origin.x + half, y), half, side_len / 2.0));
            walls.push((Vec2::new(g.origin.x + g.width - half, y), half, side_len / 2.0));
        }

        for (pos, half_width, half_height) in walls {
            let body = RigidBodyBuilder::fixed().translation(vec2_to_na(pos)).build();
            let handle = self.bodies.insert(body);
            let collider = ColliderBuilder::cuboid(half_width, half_height)
                .restitution(self.material.cushion_restitution)
                .friction(self.material.friction)
                .build();
            self.colliders
                .insert_with_parent(collider, handle, &mut self.bodies);
        }
        log::debug!("table built with {} cushion bodies", self.bodies.len());
    }

    fn create_ball(&mut self, ball: BallId, pos: Vec2) -> BallBody {
        let m = self.material;
        let rb = RigidBodyBuilder::dynamic()
            .translation(vec2_to_na(pos))
            .linear_damping(m.linear_damping)
            .angular_damping(m.angular_damping)
            .ccd_enabled(true)
            .user_data(ball.0 as u128)
            .build();
        let handle = self.bodies.insert(rb);

        let collider = ColliderBuilder::ball(self.geometry.ball_radius)
            .restitution(m.restitution)
            .friction(m.friction)
            .density(m.density)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        log::debug!("created body for {}", ball);
        BallBody {
            handle,
            prev_pos: pos,
            parked: false,
        }
    }

    /// Teleport a ball to a position with zero velocity, creating its body
    /// on first use and re-enabling it if it was parked.
    pub fn apply_placement(&mut self, placement: &Placement) {
        let Placement { ball, position } = *placement;
        let entry = match self.balls.get(&ball).copied() {
            Some(entry) => entry,
            None => {
                let created = self.create_ball(ball, position);
                self.balls.insert(ball, created);
                created
            }
        };
        if let Some(rb) = self.bodies.get_mut(entry.handle) {
            rb.set_enabled(true);
            rb.set_translation(vec2_to_na(position), true);
            rb.set_linvel(vec2_to_na(Vec2::ZERO), true);
            rb.set_angvel(0.0, true);
        }
        self.balls.insert(
            ball,
            BallBody {
                prev_pos: position,
                parked: false,
                ..entry
            },
        );
    }

    /// Set a ball's linear velocity directly.
    pub fn apply_shot(&mut self, shot: &Shot) {
        let Some(entry) = self.balls.get(&shot.ball) else {
            log::warn!("shot for {} which has no body", shot.ball);
            return;
        };
        if let Some(rb) = self.bodies.get_mut(entry.handle) {
            rb.set_linvel(vec2_to_na(shot.velocity), true);
        }
    }

    /// Step the simulation once and report pocket and floor contacts.
    pub fn step(&mut self) -> Vec<TableContact> {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        let pockets = self.geometry.pocket_positions();
        let reach = self.geometry.pocket_radius + self.geometry.ball_radius * 0.5;
        let mut contacts = Vec::new();
        let mut parks: Vec<(BallId, Vec2)> = Vec::new();

        for (id, entry) in self.balls.iter_mut() {
            if entry.parked {
                continue;
            }
            let Some(rb) = self.bodies.get(entry.handle) else {
                continue;
            };
            let pos = na_to_vec2(rb.translation());
            let pocket = pockets
                .iter()
                .find(|p| segment_point_distance(entry.prev_pos, pos, **p) < reach);
            if let Some(pocket) = pocket {
                log::debug!("{} dropped into pocket at {:?}", id, pocket);
                contacts.push(TableContact::Pocketed(*id));
                parks.push((*id, *pocket));
            } else if self.geometry.is_out_of_bounds(pos) {
                log::debug!("{} left the table at {:?}", id, pos);
                contacts.push(TableContact::HitOut(*id));
                parks.push((*id, pos));
            }
            entry.prev_pos = pos;
        }

        for (id, pos) in parks {
            self.park(id, pos);
        }
        contacts
    }

    /// Take a ball out of the simulation, leaving it at `pos`.
    fn park(&mut self, ball: BallId, pos: Vec2) {
        let Some(entry) = self.balls.get_mut(&ball) else {
            return;
        };
        entry.parked = true;
        entry.prev_pos = pos;
        if let Some(rb) = self.bodies.get_mut(entry.handle) {
            rb.set_linvel(vec2_to_na(Vec2::ZERO), false);
            rb.set_translation(vec2_to_na(pos), false);
            rb.set_enabled(false);
        }
    }

    /// Current position of a ball, if it has a body.
    pub fn ball_position(&self, ball: BallId) -> Option<Vec2> {
        let entry = self.balls.get(&ball)?;
        self.bodies
            .get(entry.handle)
            .map(|rb| na_to_vec2(rb.translation()))
    }

    /// Current linear velocity of a ball, if it has a body.
    pub fn ball_velocity(&self, ball: BallId) -> Option<Vec2> {
        let entry = self.balls.get(&ball)?;
        self.bodies.get(entry.handle).map(|rb| na_to_vec2(rb.linvel()))
    }

    pub fn is_parked(&self, ball: BallId) -> bool {
        self.balls.get(&ball).is_some_and(|b| b.parked)
    }

    /// Number of ball bodies created so far.
    pub fn ball_count(&self) -> usize {
        self.balls.len()
    }
}

impl Default for TableWorld {
    fn default() -> Self {
        Self::new(TableGeometry::default(), BallMaterial::default())
    }
}

impl SettleObserver for TableWorld {
    fn is_at_rest(&self, ball: BallId) -> bool {
        let Some(entry) = self.balls.get(&ball) else {
            return true;
        };
        if entry.parked {
            return true;
        }
        match self.bodies.get(entry.handle) {
            Some(rb) => rb.is_sleeping() || rb.linvel().norm() <= self.material.rest_speed,
            None => true,
        }
    }
}

impl Table for TableWorld {
    fn apply_placement(&mut self, placement: &Placement) {
        TableWorld::apply_placement(self, placement);
    }

    fn apply_shot(&mut self, shot: &Shot) {
        TableWorld::apply_shot(self, shot);
    }

    fn step(&mut self) -> Vec<TableContact> {
        TableWorld::step(self)
    }
}
