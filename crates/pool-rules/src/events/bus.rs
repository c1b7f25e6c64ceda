use std::collections::HashMap;

use crate::api::types::{BallId, GameState};

/// What happened to a single ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BallAction {
    /// Repositioned by the rules (start, foul return, hit-out return, rack).
    Placed,
    /// Went from rest to moving.
    Struck,
    /// Came to rest after being in flight.
    Settled,
}

/// Every notification the rule engine publishes to presentation layers.
#[derive(Debug, Clone, PartialEq)]
pub enum PoolEvent {
    BallAction { ball: BallId, action: BallAction },
    /// All balls are at rest and the next shot may be taken.
    RoundReady,
    /// Cue tip distance from the cue ball changed (pull-back or retract).
    CueMoved { distance: f32 },
    ScoreChanged { player: String, score: u32 },
    /// The active player pocketed the cue ball.
    Foul { player: String },
    /// `advanced` is false when the active player retains the turn.
    TurnChanged { player: String, advanced: bool },
    GameStateChanged { from: GameState, to: GameState },
    GameComplete { winners: Vec<String> },
    /// The game-complete banner hold time has elapsed.
    BannerCleared,
}

/// Variant tag of a [`PoolEvent`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    BallAction,
    RoundReady,
    CueMoved,
    ScoreChanged,
    Foul,
    TurnChanged,
    GameStateChanged,
    GameComplete,
    BannerCleared,
}

impl PoolEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            PoolEvent::BallAction { .. } => EventKind::BallAction,
            PoolEvent::RoundReady => EventKind::RoundReady,
            PoolEvent::CueMoved { .. } => EventKind::CueMoved,
            PoolEvent::ScoreChanged { .. } => EventKind::ScoreChanged,
            PoolEvent::Foul { .. } => EventKind::Foul,
            PoolEvent::TurnChanged { .. } => EventKind::TurnChanged,
            PoolEvent::GameStateChanged { .. } => EventKind::GameStateChanged,
            PoolEvent::GameComplete { .. } => EventKind::GameComplete,
            PoolEvent::BannerCleared => EventKind::BannerCleared,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u32);

type Handler = Box<dyn FnMut(&PoolEvent)>;

/// Typed publish/subscribe registry keyed by event variant.
/// Dispatch is synchronous, in subscription order. Publishing an event nobody
/// listens to is a silent no-op.
#[derive(Default)]
pub struct EventBus {
    subscribers: HashMap<EventKind, Vec<(SubscriptionId, Handler)>>,
    next_id: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&PoolEvent) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for handlers in self.subscribers.values_mut() {
            if let Some(idx) = handlers.iter().position(|(sid, _)| *sid == id) {
                handlers.remove(idx);
                return true;
            }
        }
        false
    }

    /// Deliver `event` to every handler of its kind. Returns how many ran.
    pub fn publish(&mut self, event: &PoolEvent) -> usize {
        match self.subscribers.get_mut(&event.kind()) {
            Some(handlers) => {
                for (_, handler) in handlers.iter_mut() {
                    handler(event);
                }
                handlers.len()
            }
            None => 0,
        }
    }

    /// Total registered handlers across all kinds.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.values().map(Vec::len).sum()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
