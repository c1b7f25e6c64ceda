use std::collections::VecDeque;

/// A player for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    name: String,
    score: u32,
    is_active_turn: bool,
    has_struck_this_turn: bool,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 0,
            is_active_turn: false,
            has_struck_this_turn: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_active_turn(&self) -> bool {
        self.is_active_turn
    }

    pub fn has_struck_this_turn(&self) -> bool {
        self.has_struck_this_turn
    }

    /// Apply a signed score change. Scores never go below zero.
    pub fn add_score(&mut self, delta: i32) -> u32 {
        self.score = apply_delta(self.score, delta);
        self.score
    }

    pub fn reset_score(&mut self) {
        self.score = 0;
    }
}

/// Score after `delta`, clamped at zero.
pub fn apply_delta(score: u32, delta: i32) -> u32 {
    if delta >= 0 {
        score.saturating_add(delta as u32)
    } else {
        score.saturating_sub(delta.unsigned_abs())
    }
}

/// Round-robin rotation of players. The front player is the active one.
#[derive(Debug, Clone)]
pub struct PlayerQueue {
    players: VecDeque<Player>,
}

impl PlayerQueue {
    /// Build the rotation in the given order. Names are validated upstream.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let players: VecDeque<Player> = names.into_iter().map(Player::new).collect();
        debug_assert!(!players.is_empty(), "player queue must not be empty");
        Self { players }
    }

    /// The player whose turn it is.
    pub fn active(&self) -> &Player {
        debug_assert!(!self.players.is_empty(), "player queue must not be empty");
        &self.players[0]
    }

    pub fn active_mut(&mut self) -> &mut Player {
        debug_assert!(!self.players.is_empty(), "player queue must not be empty");
        &mut self.players[0]
    }

    /// Move the front player to the back. Returns the new active player.
    pub fn advance(&mut self) -> &Player {
        if let Some(front) = self.players.pop_front() {
            self.players.push_back(front);
        }
        self.active()
    }

    /// Start a turn: clear every strike flag and mark only the front player active.
    pub fn begin_turn(&mut self) {
        for (i, player) in self.players.iter_mut().enumerate() {
            player.is_active_turn = i == 0;
            player.has_struck_this_turn = false;
        }
    }

    /// A ball was struck. Only counts for the player whose turn is live.
    pub fn record_strike(&mut self) -> bool {
        match self.players.front_mut() {
            Some(player) if player.is_active_turn => {
                player.has_struck_this_turn = true;
                true
            }
            _ => false,
        }
    }

    /// Zero every score for a new game.
    pub fn reset_scores(&mut self) {
        for player in &mut self.players {
            player.reset_score();
        }
    }

    pub fn get(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    /// Players in rotation order, active first.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn max_score(&self) -> u32 {
        self.players.iter().map(|p| p.score).max().unwrap_or(0)
    }
}
