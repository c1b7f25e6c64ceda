//! Pool ball data: catalogue, rack positions, and per-session ball state.

use glam::Vec2;

use crate::api::types::BallId;
use super::shot::ShotTracker;

/// Ball type: solid (1-8) or striped (9-15)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallKind {
    Cue,
    Solid,
    Striped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallColor {
    White,
    Yellow,
    Blue,
    Red,
    Purple,
    Orange,
    Green,
    Maroon,
    Black,
}

/// Pool ball definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BallDef {
    pub number: u8,
    pub kind: BallKind,
    pub color: BallColor,
}

/// All 16 pool balls (cue + 15 numbered)
pub const BALLS: [BallDef; 16] = [
    BallDef { number: 0, kind: BallKind::Cue, color: BallColor::White },
    BallDef { number: 1, kind: BallKind::Solid, color: BallColor::Yellow },
    BallDef { number: 2, kind: BallKind::Solid, color: BallColor::Blue },
    BallDef { number: 3, kind: BallKind::Solid, color: BallColor::Red },
    BallDef { number: 4, kind: BallKind::Solid, color: BallColor::Purple },
    BallDef { number: 5, kind: BallKind::Solid, color: BallColor::Orange },
    BallDef { number: 6, kind: BallKind::Solid, color: BallColor::Green },
    BallDef { number: 7, kind: BallKind::Solid, color: BallColor::Maroon },
    BallDef { number: 8, kind: BallKind::Solid, color: BallColor::Black },
    // Striped balls 9-15 (same colors as 1-7)
    BallDef { number: 9, kind: BallKind::Striped, color: BallColor::Yellow },
    BallDef { number: 10, kind: BallKind::Striped, color: BallColor::Blue },
    BallDef { number: 11, kind: BallKind::Striped, color: BallColor::Red },
    BallDef { number: 12, kind: BallKind::Striped, color: BallColor::Purple },
    BallDef { number: 13, kind: BallKind::Striped, color: BallColor::Orange },
    BallDef { number: 14, kind: BallKind::Striped, color: BallColor::Green },
    BallDef { number: 15, kind: BallKind::Striped, color: BallColor::Maroon },
];

/// Triangle rack for `count` object balls.
/// The apex points LEFT toward the cue ball, rows spread RIGHT; row `r` holds
/// `r + 1` balls and a short final row is centred.
///
/// ```text
///  1            <- apex (row 0)
///  2  3         <- row 1
///  4  5  6      <- row 2
///     7         <- row 3 (seven-ball)
/// ```
pub fn rack_positions(apex: Vec2, ball_radius: f32, count: usize) -> Vec<Vec2> {
    // Gap between balls (tight rack)
    let gap = ball_radius * 2.0 + 1.0;
    let row_offset = gap * 0.866; // sqrt(3)/2 for equilateral triangle

    let mut positions = Vec::with_capacity(count);
    let mut row = 0usize;
    while positions.len() < count {
        let in_row = (row + 1).min(count - positions.len());
        let x = apex.x + row as f32 * row_offset;
        for i in 0..in_row {
            let v_offset = i as f32 - (in_row as f32 - 1.0) / 2.0;
            positions.push(Vec2::new(x, apex.y + v_offset * gap));
        }
        row += 1;
    }
    positions
}

/// A ball for the lifetime of a session. Never destroyed, only repositioned.
#[derive(Debug, Clone)]
pub struct Ball {
    pub id: BallId,
    pub def: BallDef,
    /// Where the ball returns to when replaced after a foul or hit-out.
    pub home: Vec2,
    /// Set once the ball's pocketing has been resolved in a turn; stops it
    /// from being scored again in a later pass.
    pub pocketed_this_turn: bool,
    /// Whether the ball has been put on the table (cue at start, object balls
    /// when racked). Off-table balls are not polled.
    pub on_table: bool,
    pub tracker: ShotTracker,
}

impl Ball {
    pub fn new(def: BallDef, home: Vec2) -> Self {
        Self {
            id: BallId(def.number),
            def,
            home,
            pocketed_this_turn: false,
            on_table: false,
            tracker: ShotTracker::new(),
        }
    }

    pub fn is_cue(&self) -> bool {
        self.def.kind == BallKind::Cue
    }
}

/// The cue ball plus the object balls of the selected game type.
#[derive(Debug, Clone)]
pub struct BallSet {
    balls: Vec<Ball>,
}

impl BallSet {
    /// Cue ball at `cue_start`, object balls `1..=count` at their rack spots.
    pub fn new(cue_start: Vec2, rack_apex: Vec2, ball_radius: f32, count: usize) -> Self {
        let mut balls = Vec::with_capacity(count + 1);
        balls.push(Ball::new(BALLS[0], cue_start));
        let homes = rack_positions(rack_apex, ball_radius, count);
        for (def, home) in BALLS[1..].iter().zip(homes) {
            balls.push(Ball::new(*def, home));
        }
        Self { balls }
    }

    /// Look up a ball by id.
    pub fn get(&self, id: BallId) -> Option<&Ball> {
        self.balls.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: BallId) -> Option<&mut Ball> {
        self.balls.get_mut(id.0 as usize)
    }

    pub fn cue(&self) -> &Ball {
        &self.balls[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ball> {
        self.balls.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Ball> {
        self.balls.iter_mut()
    }

    /// Object balls only (everything but the cue).
    pub fn object_balls(&self) -> impl Iterator<Item = &Ball> {
        self.balls.iter().skip(1)
    }

    /// Number of balls including the cue.
    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    pub fn contains(&self, id: BallId) -> bool {
        (id.0 as usize) < self.balls.len()
    }
}
