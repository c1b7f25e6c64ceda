use crate::api::config::{ConfigError, SessionConfig};
use crate::api::observer::{Placement, SettleObserver, Shot, TableContact};
use crate::api::types::{BallId, GameState};
use crate::core::scheduler::{Scheduler, TaskId};
use crate::core::time::FixedTimestep;
use crate::events::bus::{BallAction, EventBus, EventKind, PoolEvent, SubscriptionId};
use crate::rules::balls::BallSet;
use crate::rules::cue::CueStick;
use crate::rules::players::PlayerQueue;
use crate::rules::resolver::{TurnOutcome, TurnResolver, TurnVerdict};
use crate::rules::round::RoundState;
use crate::rules::shot::ShotTransition;

/// Errors from driving a session with requests it cannot honour.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {requested} while in {from}")]
    InvalidTransition {
        from: GameState,
        requested: &'static str,
    },
    #[error("unknown ball: {0}")]
    UnknownBall(BallId),
}

/// Actions that run after a fixed delay on the session clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    BeginPlay,
    ClearCompleteBanner,
}

/// Owns all game state and is the only thing that advances turns.
///
/// The host calls [`GameSession::tick`] once per fixed update with a
/// [`SettleObserver`], feeds trigger notifications through
/// [`GameSession::apply_contacts`], and drains [`Placement`]s to move bodies.
pub struct GameSession {
    config: SessionConfig,
    state: GameState,
    previous_state: GameState,
    balls: BallSet,
    players: PlayerQueue,
    round: RoundState,
    resolver: TurnResolver,
    cue: CueStick,
    clock: FixedTimestep,
    deferred: Scheduler<Deferred>,
    begin_play: Option<TaskId>,
    bus: EventBus,
    placements: Vec<Placement>,
    racked: bool,
    games_played: u32,
    winners: Vec<String>,
}

impl GameSession {
    /// Build a session in Practice with the cue ball placed at its start.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let table = config.table;
        let count = config.game_type.object_balls();
        let mut session = Self {
            state: GameState::Practice,
            previous_state: GameState::Practice,
            balls: BallSet::new(table.cue_start, table.rack_apex, table.ball_radius, count),
            players: PlayerQueue::new(config.players.iter().cloned()),
            round: RoundState::new(),
            resolver: TurnResolver::new(count),
            cue: CueStick::new(config.cue),
            clock: FixedTimestep::new(config.timing.fixed_dt),
            deferred: Scheduler::new(),
            begin_play: None,
            bus: EventBus::new(),
            placements: Vec::new(),
            racked: false,
            games_played: 0,
            winners: Vec::new(),
            config,
        };
        session.place_ball(BallId::CUE);
        log::info!(
            "session created: {:?} with {} players",
            session.config.game_type,
            session.players.len()
        );
        Ok(session)
    }

    /// Parse a JSON configuration and build a session from it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::new(SessionConfig::from_json(json)?)
    }

    // -- Accessors --

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn previous_state(&self) -> GameState {
        self.previous_state
    }

    pub fn players(&self) -> &PlayerQueue {
        &self.players
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn balls(&self) -> &BallSet {
        &self.balls
    }

    pub fn cue(&self) -> &CueStick {
        &self.cue
    }

    /// Winners of the most recently completed game.
    pub fn winners(&self) -> &[String] {
        &self.winners
    }

    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    /// Current tick on the session clock.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn pending_deferrals(&self) -> usize {
        self.deferred.len()
    }

    /// Score for a named player. Unknown names are logged, not propagated,
    /// so a presentation mismatch cannot break the caller.
    pub fn player_score(&self, name: &str) -> Option<u32> {
        let score = self.players.get(name).map(|p| p.score());
        if score.is_none() {
            log::warn!("no player named {:?}", name);
        }
        score
    }

    // -- Observers --

    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&PoolEvent) + 'static,
    ) -> SubscriptionId {
        self.bus.subscribe(kind, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Drain all pending placements. Returns a Vec and clears the queue.
    pub fn drain_placements(&mut self) -> Vec<Placement> {
        std::mem::take(&mut self.placements)
    }

    // -- State transitions --

    /// Practice/Complete/Pause -> GetSet. Play begins after the setup delay.
    pub fn request_get_set(&mut self) -> Result<(), SessionError> {
        match self.state {
            GameState::Practice | GameState::Complete => {
                // cue and cue ball go back to their starting positions
                self.place_ball(BallId::CUE);
                self.cue.ready();
            }
            GameState::Pause => {}
            from => {
                return Err(SessionError::InvalidTransition {
                    from,
                    requested: "get set",
                })
            }
        }
        self.change_state(GameState::GetSet);

        let due = self.clock.now() + self.clock.ticks_for(self.config.timing.setup_delay_secs);
        self.begin_play = Some(self.deferred.schedule_at(due, Deferred::BeginPlay));
        Ok(())
    }

    /// GetSet -> Play, or Pause -> Play. A GetSet entered from Pause resumes;
    /// any other GetSet starts a new game.
    pub fn request_play(&mut self) -> Result<(), SessionError> {
        match (self.state, self.previous_state) {
            (GameState::Pause, _) | (GameState::GetSet, GameState::Pause) => {
                self.cancel_begin_play();
                self.change_state(GameState::Play);
                log::info!("play resumed");
                Ok(())
            }
            (GameState::GetSet, _) => {
                self.cancel_begin_play();
                self.start_game();
                Ok(())
            }
            (from, _) => Err(SessionError::InvalidTransition {
                from,
                requested: "play",
            }),
        }
    }

    /// Play -> Pause.
    pub fn request_pause(&mut self) -> Result<(), SessionError> {
        if self.state != GameState::Play {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                requested: "pause",
            });
        }
        self.change_state(GameState::Pause);
        Ok(())
    }

    /// Drop all pending deferrals and return to Practice with zeroed scores.
    pub fn reset(&mut self) {
        self.deferred.clear();
        self.begin_play = None;
        self.round.clear();
        self.players.reset_scores();
        self.winners.clear();
        for ball in self.balls.iter_mut() {
            ball.tracker.ready();
        }
        self.cue.ready();
        self.place_ball(BallId::CUE);
        self.change_state(GameState::Practice);
        log::info!("session reset");
    }

    fn change_state(&mut self, next: GameState) {
        if next == self.state {
            return;
        }
        let from = self.state;
        self.previous_state = from;
        self.state = next;
        log::info!("game state {} -> {}", from, next);
        self.publish(PoolEvent::GameStateChanged { from, to: next });
    }

    fn cancel_begin_play(&mut self) {
        if let Some(id) = self.begin_play.take() {
            self.deferred.cancel(id);
        }
    }

    fn start_game(&mut self) {
        self.round.clear();
        self.players.reset_scores();
        self.winners.clear();
        self.games_played += 1;

        self.change_state(GameState::Play);
        self.place_ball(BallId::CUE);
        self.rack();
        self.players.begin_turn();
        self.cue.ready();

        let names: Vec<String> = self.players.iter().map(|p| p.name().to_string()).collect();
        for player in names {
            self.publish(PoolEvent::ScoreChanged { player, score: 0 });
        }
        let player = self.players.active().name().to_string();
        log::info!("game {} started, {} breaks", self.games_played, player);
        self.publish(PoolEvent::TurnChanged {
            player,
            advanced: false,
        });
    }

    /// Every object ball goes back to its rack spot at the start of each game.
    fn rack(&mut self) {
        let ids: Vec<BallId> = self.balls.object_balls().map(|b| b.id).collect();
        for id in &ids {
            self.place_ball(*id);
        }
        if self.racked {
            log::debug!("re-racked {} object balls", ids.len());
        } else {
            log::info!("racked {} object balls", ids.len());
            self.racked = true;
        }
    }

    // -- Cue --

    pub fn aim_cue(&mut self, direction: glam::Vec2) {
        self.cue.set_aim(direction);
    }

    /// Pull the cue back (or ease it forward). Only while a shot can be taken.
    pub fn pull_cue(&mut self, offset: f32) -> bool {
        if !self.can_shoot() || !self.cue.pull(offset) {
            return false;
        }
        let distance = self.cue.distance();
        self.publish(PoolEvent::CueMoved { distance });
        true
    }

    /// Release the cue. The returned shot is for the physics collaborator to
    /// apply; the strike itself is detected when the cue ball starts moving.
    pub fn release_cue(&mut self) -> Option<Shot> {
        if !self.can_shoot() {
            return None;
        }
        let shot = self.cue.release(BallId::CUE);
        let distance = self.cue.distance();
        self.publish(PoolEvent::CueMoved { distance });
        shot
    }

    fn can_shoot(&self) -> bool {
        matches!(self.state, GameState::Practice | GameState::Play)
    }

    // -- Physics notifications --

    /// Record a single pocket or floor trigger.
    pub fn record_contact(&mut self, contact: TableContact) -> Result<(), SessionError> {
        let ball = contact.ball();
        if !self.balls.contains(ball) {
            return Err(SessionError::UnknownBall(ball));
        }
        let recorded = match contact {
            TableContact::Pocketed(ball) => self.round.record_pocketed(ball),
            TableContact::HitOut(ball) => self.round.record_hit_out(ball),
        };
        if recorded {
            log::debug!("{:?}", contact);
        }
        Ok(())
    }

    /// Record a tick's worth of triggers. Pockets are applied before floor
    /// hits so a ball seen by both in one tick only counts as pocketed.
    /// A batch naming an unknown ball is rejected whole.
    pub fn apply_contacts(&mut self, contacts: &[TableContact]) -> Result<(), SessionError> {
        if let Some(unknown) = contacts
            .iter()
            .map(TableContact::ball)
            .find(|b| !self.balls.contains(*b))
        {
            return Err(SessionError::UnknownBall(unknown));
        }
        let pockets = contacts
            .iter()
            .filter(|c| matches!(c, TableContact::Pocketed(_)));
        let floors = contacts
            .iter()
            .filter(|c| matches!(c, TableContact::HitOut(_)));
        for contact in pockets.chain(floors) {
            self.record_contact(*contact)?;
        }
        Ok(())
    }

    /// One fixed update: fire due deferrals, advance the cue retract, then
    /// poll every ball on the table for settle transitions.
    pub fn tick<O: SettleObserver + ?Sized>(&mut self, observer: &O) {
        let now = self.clock.advance();
        for action in self.deferred.drain_due(now) {
            self.run_deferred(action);
        }

        if let Some(distance) = self.cue.tick(self.clock.dt()) {
            self.publish(PoolEvent::CueMoved { distance });
        }

        let on_table: Vec<BallId> = self.balls.iter().filter(|b| b.on_table).map(|b| b.id).collect();
        let mut transitions = Vec::new();
        for id in on_table {
            let at_rest = observer.is_at_rest(id);
            if let Some(t) = self.balls.get_mut(id).and_then(|b| b.tracker.poll(at_rest)) {
                transitions.push((id, t));
            }
        }
        // Strikes land before settles: a ball set moving on the tick another
        // stops belongs to the same turn.
        transitions.sort_by_key(|(_, t)| *t == ShotTransition::Settled);
        for (id, transition) in transitions {
            self.on_transition(id, transition);
        }
    }

    /// A turn is live in Play, in Pause, and in a GetSet on the way back
    /// from Pause. Strikes and settles are counted only while it is.
    fn turn_in_progress(&self) -> bool {
        match self.state {
            GameState::Play | GameState::Pause => true,
            GameState::GetSet => self.previous_state == GameState::Pause,
            GameState::Practice | GameState::Complete => false,
        }
    }

    fn run_deferred(&mut self, action: Deferred) {
        match action {
            Deferred::BeginPlay => {
                self.begin_play = None;
                if let Err(e) = self.request_play() {
                    log::warn!("deferred play start skipped: {}", e);
                }
            }
            Deferred::ClearCompleteBanner => {
                self.publish(PoolEvent::BannerCleared);
                if self.state == GameState::Complete {
                    self.change_state(GameState::Practice);
                }
            }
        }
    }

    fn on_transition(&mut self, ball: BallId, transition: ShotTransition) {
        log::debug!("{} {:?}", ball, transition);
        match transition {
            ShotTransition::Placed | ShotTransition::InFlight => {}
            ShotTransition::Struck => {
                let playing = self.state == GameState::Play;
                if self.turn_in_progress() {
                    self.round.ball_struck();
                    self.players.record_strike();
                }
                if ball.is_cue() {
                    let retract = playing.then_some(self.config.timing.cue_retract_secs);
                    self.cue.on_struck(retract);
                }
                self.publish(PoolEvent::BallAction {
                    ball,
                    action: BallAction::Struck,
                });
            }
            ShotTransition::Settled => {
                self.publish(PoolEvent::BallAction {
                    ball,
                    action: BallAction::Settled,
                });
                self.ball_settled();
            }
        }
    }

    fn ball_settled(&mut self) {
        if self.turn_in_progress() {
            if self.round.balls_in_motion() == 0 {
                log::warn!("ball settled with nothing in flight");
            } else if self.round.ball_settled() {
                self.resolve_turn();
            }
        } else if self.state == GameState::Practice {
            // no turns in practice; the cue ball simply goes back
            self.place_ball(BallId::CUE);
            self.round_ready();
        }
    }

    fn resolve_turn(&mut self) {
        let outcome = self.resolver.resolve(&self.round, &self.players, &self.balls);
        self.commit(outcome);
    }

    fn commit(&mut self, outcome: TurnOutcome) {
        let player = self.players.active().name().to_string();
        match outcome.verdict {
            TurnVerdict::Foul => {
                log::info!("{} pocketed the cue ball", player);
                self.publish(PoolEvent::Foul {
                    player: player.clone(),
                });
            }
            TurnVerdict::Scored(n) => log::info!("{} pocketed {} ball(s)", player, n),
            TurnVerdict::Miss => log::debug!("{} pocketed nothing new", player),
            TurnVerdict::NoStrike => log::debug!("{} has not struck; nothing to resolve", player),
        }

        if outcome.score_delta != 0 {
            let score = self.players.active_mut().add_score(outcome.score_delta);
            debug_assert_eq!(score, outcome.projected_score);
            self.publish(PoolEvent::ScoreChanged {
                player: player.clone(),
                score,
            });
        }
        if outcome.remove_cue {
            self.round.remove_pocketed(BallId::CUE);
        }
        for id in &outcome.resolved {
            if let Some(ball) = self.balls.get_mut(*id) {
                ball.pocketed_this_turn = true;
            }
        }
        for id in &outcome.replace {
            self.place_ball(*id);
        }
        self.round.clear_hit_out();

        if outcome.advance {
            self.players.advance();
        }
        self.players.begin_turn();

        match outcome.winners {
            Some(winners) => self.complete(winners),
            None => {
                let next = self.players.active().name().to_string();
                self.publish(PoolEvent::TurnChanged {
                    player: next,
                    advanced: outcome.advance,
                });
                self.round_ready();
            }
        }
    }

    fn complete(&mut self, winners: Vec<String>) {
        log::info!("game complete, winners: {}", winners.join(", "));
        self.winners = winners.clone();
        for ball in self.balls.iter_mut() {
            ball.tracker.ready();
        }
        self.cue.ready();
        self.change_state(GameState::Complete);
        self.publish(PoolEvent::GameComplete { winners });

        let due = self.clock.now() + self.clock.ticks_for(self.config.timing.complete_banner_secs);
        self.deferred.schedule_at(due, Deferred::ClearCompleteBanner);
    }

    /// Settled balls cycle back to Default and the cue unlocks.
    fn round_ready(&mut self) {
        for ball in self.balls.iter_mut() {
            ball.tracker.ready();
        }
        self.cue.ready();
        self.publish(PoolEvent::RoundReady);
    }

    fn place_ball(&mut self, id: BallId) {
        let Some(ball) = self.balls.get_mut(id) else {
            return;
        };
        ball.tracker.place();
        ball.pocketed_this_turn = false;
        ball.on_table = true;
        let position = ball.home;
        self.placements.push(Placement { ball: id, position });
        self.publish(PoolEvent::BallAction {
            ball: id,
            action: BallAction::Placed,
        });
    }

    fn publish(&mut self, event: PoolEvent) {
        self.bus.publish(&event);
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("state", &self.state)
            .field("previous_state", &self.previous_state)
            .field("round", &self.round)
            .field("players", &self.players)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::GameType;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    /// Physics stand-in: every ball is at rest unless marked moving.
    #[derive(Default)]
    struct FakeTable {
        moving: HashSet<BallId>,
    }

    impl SettleObserver for FakeTable {
        fn is_at_rest(&self, ball: BallId) -> bool {
            !self.moving.contains(&ball)
        }
    }

    fn record_events(session: &mut GameSession, kind: EventKind) -> Rc<RefCell<Vec<PoolEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        session.subscribe(kind, move |e| sink.borrow_mut().push(e.clone()));
        seen
    }

    fn run_ticks(session: &mut GameSession, table: &FakeTable, n: u32) {
        for _ in 0..n {
            session.tick(table);
        }
    }

    /// A session in Play with every ball racked and resting.
    fn playing(game_type: GameType, names: &[&str]) -> (GameSession, FakeTable) {
        let mut session = GameSession::new(SessionConfig::new(game_type, names)).unwrap();
        let table = FakeTable::default();
        session.tick(&table);
        session.request_get_set().unwrap();
        run_ticks(&mut session, &table, 180);
        assert_eq!(session.state(), GameState::Play);
        session.tick(&table);
        (session, table)
    }

    /// Set `moving` in motion, deliver `contacts`, then let everything rest.
    fn shoot(session: &mut GameSession, table: &mut FakeTable, moving: &[BallId], contacts: &[TableContact]) {
        table.moving = moving.iter().copied().collect();
        session.tick(table); // struck
        session.tick(table); // in flight
        session.apply_contacts(contacts).unwrap();
        table.moving.clear();
        session.tick(table); // settled
        session.tick(table); // replaced balls come to rest
    }

    fn score(session: &GameSession, name: &str) -> u32 {
        session.player_score(name).unwrap()
    }

    #[test]
    fn starts_in_practice_with_cue_placed() {
        let mut session =
            GameSession::new(SessionConfig::new(GameType::ThreeBall, &["p1", "p2"])).unwrap();
        assert_eq!(session.state(), GameState::Practice);
        let placements = session.drain_placements();
        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].ball, BallId::CUE);
        assert_eq!(placements[0].position, session.config().table.cue_start);
        assert!(session.drain_placements().is_empty());
    }

    #[test]
    fn rejects_bad_config_at_setup() {
        let err = GameSession::new(SessionConfig::new(GameType::ThreeBall, &[])).unwrap_err();
        assert!(matches!(err, ConfigError::NoPlayers));
        assert!(GameSession::from_json(r#"{ "game_type": 5, "players": ["a"] }"#).is_err());
    }

    #[test]
    fn get_set_waits_for_setup_delay_then_racks_once() {
        let mut session =
            GameSession::new(SessionConfig::new(GameType::ThreeBall, &["p1", "p2"])).unwrap();
        let table = FakeTable::default();
        session.drain_placements();
        session.request_get_set().unwrap();
        assert_eq!(session.state(), GameState::GetSet);
        assert_eq!(session.previous_state(), GameState::Practice);

        run_ticks(&mut session, &table, 179);
        assert_eq!(session.state(), GameState::GetSet);
        session.tick(&table);
        assert_eq!(session.state(), GameState::Play);
        assert_eq!(session.games_played(), 1);

        let placed: Vec<BallId> = session.drain_placements().iter().map(|p| p.ball).collect();
        assert_eq!(placed, vec![BallId::CUE, BallId::CUE, BallId(1), BallId(2), BallId(3)]);
        assert!(session.players().active().is_active_turn());
    }

    #[test]
    fn invalid_transitions_are_rejected() {
        let (mut session, _) = playing(GameType::ThreeBall, &["p1"]);
        assert_eq!(
            session.request_get_set(),
            Err(SessionError::InvalidTransition {
                from: GameState::Play,
                requested: "get set"
            })
        );
        assert!(session.request_play().is_err());
        session.request_pause().unwrap();
        assert!(session.request_pause().is_err());
    }

    #[test]
    fn scenario_a_pocketing_retains_turn() {
        let (mut session, mut table) = playing(GameType::ThreeBall, &["p1", "p2"]);
        let turns = record_events(&mut session, EventKind::TurnChanged);

        shoot(
            &mut session,
            &mut table,
            &[BallId::CUE, BallId(1), BallId(2)],
            &[TableContact::Pocketed(BallId(1)), TableContact::Pocketed(BallId(2))],
        );

        assert_eq!(score(&session, "p1"), 2);
        assert_eq!(session.players().active().name(), "p1");
        assert_eq!(session.round().pocketed().len(), 2);
        assert_eq!(session.state(), GameState::Play);
        assert_eq!(
            *turns.borrow(),
            vec![PoolEvent::TurnChanged {
                player: "p1".into(),
                advanced: false
            }]
        );
    }

    #[test]
    fn scenario_b_foul_with_last_ball_completes_game() {
        let (mut session, mut table) = playing(GameType::ThreeBall, &["p1", "p2"]);
        shoot(
            &mut session,
            &mut table,
            &[BallId::CUE, BallId(1), BallId(2)],
            &[TableContact::Pocketed(BallId(1)), TableContact::Pocketed(BallId(2))],
        );
        session.drain_placements();
        let complete = record_events(&mut session, EventKind::GameComplete);
        let fouls = record_events(&mut session, EventKind::Foul);

        shoot(
            &mut session,
            &mut table,
            &[BallId::CUE, BallId(3)],
            &[TableContact::Pocketed(BallId::CUE), TableContact::Pocketed(BallId(3))],
        );

        assert_eq!(score(&session, "p1"), 1);
        assert_eq!(score(&session, "p2"), 0);
        assert_eq!(session.players().active().name(), "p2");
        assert!(!session.round().is_pocketed(BallId::CUE));
        assert_eq!(session.round().pocketed().len(), 3);
        assert!(session.balls().get(BallId(3)).unwrap().pocketed_this_turn);

        let placed = session.drain_placements();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].ball, BallId::CUE);

        assert_eq!(session.state(), GameState::Complete);
        assert_eq!(session.winners(), ["p1".to_string()]);
        assert_eq!(complete.borrow().len(), 1);
        assert_eq!(fouls.borrow().len(), 1);
    }

    #[test]
    fn scenario_c_empty_shot_advances() {
        let (mut session, mut table) = playing(GameType::ThreeBall, &["p1", "p2"]);
        let turns = record_events(&mut session, EventKind::TurnChanged);
        shoot(&mut session, &mut table, &[BallId::CUE], &[]);

        assert_eq!(session.players().active().name(), "p2");
        assert_eq!(score(&session, "p1"), 0);
        assert_eq!(score(&session, "p2"), 0);
        assert_eq!(
            *turns.borrow(),
            vec![PoolEvent::TurnChanged {
                player: "p2".into(),
                advanced: true
            }]
        );
    }

    #[test]
    fn scenario_d_floor_and_pocket_same_tick_counts_as_pocketed() {
        let (mut session, mut table) = playing(GameType::SixBall, &["p1", "p2"]);
        session.drain_placements();
        shoot(
            &mut session,
            &mut table,
            &[BallId::CUE, BallId(4)],
            &[TableContact::HitOut(BallId(4)), TableContact::Pocketed(BallId(4))],
        );

        assert!(session.round().is_pocketed(BallId(4)));
        assert!(session.round().hit_out().is_empty());
        assert_eq!(score(&session, "p1"), 1);
        assert!(session.drain_placements().is_empty(), "pocketed ball stays in the pocket");
    }

    #[test]
    fn hit_out_ball_is_replaced_and_turn_advances() {
        let (mut session, mut table) = playing(GameType::SixBall, &["p1", "p2"]);
        session.drain_placements();
        shoot(
            &mut session,
            &mut table,
            &[BallId::CUE, BallId(5)],
            &[TableContact::HitOut(BallId(5))],
        );

        let placed = session.drain_placements();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].ball, BallId(5));
        assert_eq!(placed[0].position, session.balls().get(BallId(5)).unwrap().home);
        assert!(session.round().hit_out().is_empty());
        assert_eq!(session.players().active().name(), "p2");
    }

    #[test]
    fn resolution_waits_for_last_ball() {
        let (mut session, mut table) = playing(GameType::ThreeBall, &["p1", "p2"]);
        table.moving = [BallId::CUE, BallId(1)].into_iter().collect();
        session.tick(&table);
        session.tick(&table);
        assert_eq!(session.round().balls_in_motion(), 2);

        table.moving.remove(&BallId::CUE);
        run_ticks(&mut session, &table, 5);
        assert_eq!(session.round().balls_in_motion(), 1);
        assert_eq!(session.players().active().name(), "p1", "not resolved yet");

        table.moving.clear();
        session.tick(&table);
        assert_eq!(session.round().balls_in_motion(), 0);
        assert_eq!(session.players().active().name(), "p2");
    }

    #[test]
    fn previously_resolved_balls_never_rescore() {
        let (mut session, mut table) = playing(GameType::SevenBall, &["p1", "p2"]);
        shoot(&mut session, &mut table, &[BallId::CUE], &[TableContact::Pocketed(BallId(1))]);
        assert_eq!(score(&session, "p1"), 1);

        // ball 1 still sits in the pocketed set; a miss must not score it again
        shoot(&mut session, &mut table, &[BallId::CUE], &[TableContact::Pocketed(BallId(1))]);
        assert_eq!(score(&session, "p1"), 1);
        assert_eq!(session.players().active().name(), "p2");
    }

    #[test]
    fn pause_resume_keeps_scores_and_still_resolves() {
        let (mut session, mut table) = playing(GameType::SevenBall, &["p1", "p2"]);
        shoot(&mut session, &mut table, &[BallId::CUE], &[TableContact::Pocketed(BallId(2))]);

        // pause mid-shot: the settle still resolves the turn
        table.moving = [BallId::CUE].into_iter().collect();
        session.tick(&table);
        session.tick(&table);
        session.request_pause().unwrap();
        table.moving.clear();
        session.tick(&table);
        assert_eq!(session.players().active().name(), "p2");

        session.request_get_set().unwrap();
        assert_eq!(session.previous_state(), GameState::Pause);
        run_ticks(&mut session, &table, 180);
        assert_eq!(session.state(), GameState::Play);
        assert_eq!(score(&session, "p1"), 1, "resume does not reset scores");
        assert_eq!(session.games_played(), 1);
    }

    #[test]
    fn direct_resume_from_pause() {
        let (mut session, _) = playing(GameType::ThreeBall, &["p1"]);
        session.request_pause().unwrap();
        session.request_play().unwrap();
        assert_eq!(session.state(), GameState::Play);
        assert_eq!(session.previous_state(), GameState::Pause);
    }

    #[test]
    fn completion_banner_returns_to_practice() {
        let (mut session, mut table) = playing(GameType::JustCue, &["p1", "p2"]);
        let states = record_events(&mut session, EventKind::GameStateChanged);
        let banners = record_events(&mut session, EventKind::BannerCleared);
        shoot(&mut session, &mut table, &[BallId::CUE, BallId(1)], &[TableContact::Pocketed(BallId(1))]);
        assert_eq!(session.state(), GameState::Complete);
        assert_eq!(session.winners(), ["p1".to_string()]);

        run_ticks(&mut session, &table, 300);
        assert_eq!(session.state(), GameState::Practice);
        assert_eq!(banners.borrow().len(), 1);
        assert_eq!(
            *states.borrow(),
            vec![
                PoolEvent::GameStateChanged { from: GameState::Play, to: GameState::Complete },
                PoolEvent::GameStateChanged { from: GameState::Complete, to: GameState::Practice },
            ]
        );
    }

    #[test]
    fn tied_scores_produce_multiple_winners() {
        let (mut session, mut table) = playing(GameType::ThreeBall, &["p1", "p2"]);
        shoot(&mut session, &mut table, &[BallId::CUE], &[TableContact::Pocketed(BallId(1))]);
        shoot(&mut session, &mut table, &[BallId::CUE], &[]);
        assert_eq!(session.players().active().name(), "p2");
        shoot(&mut session, &mut table, &[BallId::CUE], &[TableContact::Pocketed(BallId(2))]);
        shoot(
            &mut session,
            &mut table,
            &[BallId::CUE],
            &[TableContact::Pocketed(BallId::CUE), TableContact::Pocketed(BallId(3))],
        );
        // p2 fouled from 1 to 0 on the final ball; p1 leads alone
        assert_eq!(session.winners(), ["p1".to_string()]);

        let (mut session, mut table) = playing(GameType::JustCue, &["p1", "p2"]);
        shoot(&mut session, &mut table, &[BallId::CUE], &[]);
        shoot(
            &mut session,
            &mut table,
            &[BallId::CUE],
            &[TableContact::Pocketed(BallId::CUE), TableContact::Pocketed(BallId(1))],
        );
        // winners are listed in rotation order; p2 is still up when the game ends
        assert_eq!(session.winners(), ["p2".to_string(), "p1".to_string()]);
    }

    #[test]
    fn new_game_after_completion_reracks_and_can_finish() {
        let (mut session, mut table) = playing(GameType::JustCue, &["p1", "p2"]);
        shoot(&mut session, &mut table, &[BallId::CUE], &[TableContact::Pocketed(BallId(1))]);
        assert_eq!(session.state(), GameState::Complete);
        session.drain_placements();

        session.request_get_set().unwrap();
        run_ticks(&mut session, &table, 180);
        assert_eq!(session.state(), GameState::Play);
        assert_eq!(session.games_played(), 2);
        assert_eq!(score(&session, "p1"), 0);
        assert!(session.round().pocketed().is_empty());

        let placed: Vec<BallId> = session.drain_placements().iter().map(|p| p.ball).collect();
        assert_eq!(placed, vec![BallId::CUE, BallId::CUE, BallId(1)]);
        assert!(!session.balls().get(BallId(1)).unwrap().pocketed_this_turn);

        // the second game finishes just like the first
        session.tick(&table);
        shoot(&mut session, &mut table, &[BallId::CUE], &[TableContact::Pocketed(BallId(1))]);
        assert_eq!(session.state(), GameState::Complete);
        assert_eq!(session.winners(), ["p1".to_string()]);
    }

    #[test]
    fn ball_struck_on_the_tick_the_cue_stops_stays_with_the_shooter() {
        let (mut session, mut table) = playing(GameType::ThreeBall, &["p1", "p2"]);
        table.moving = [BallId::CUE].into_iter().collect();
        session.tick(&table);
        session.tick(&table);

        // stun shot: the cue stops dead as ball 1 starts rolling
        table.moving = [BallId(1)].into_iter().collect();
        session.tick(&table);
        assert_eq!(session.players().active().name(), "p1");
        assert!(session.players().active().has_struck_this_turn());
        assert_eq!(session.round().balls_in_motion(), 1);

        session.tick(&table);
        session.apply_contacts(&[TableContact::Pocketed(BallId(1))]).unwrap();
        table.moving.clear();
        session.tick(&table);

        assert_eq!(score(&session, "p1"), 1);
        assert_eq!(score(&session, "p2"), 0);
        assert_eq!(session.players().active().name(), "p1");
        assert_eq!(session.round().balls_in_motion(), 0);
    }

    #[test]
    fn settle_during_get_set_from_pause_still_resolves() {
        let (mut session, mut table) = playing(GameType::ThreeBall, &["p1", "p2"]);
        table.moving = [BallId::CUE].into_iter().collect();
        session.tick(&table);
        session.tick(&table);
        session.request_pause().unwrap();
        session.request_get_set().unwrap();

        table.moving.clear();
        session.tick(&table);
        assert_eq!(session.state(), GameState::GetSet);
        assert_eq!(session.round().balls_in_motion(), 0);
        assert_eq!(session.players().active().name(), "p2");

        run_ticks(&mut session, &table, 180);
        assert_eq!(session.state(), GameState::Play);
        assert!(!session.cue().is_locked());
        assert!(session.pull_cue(2.0), "next player can shoot");
    }

    #[test]
    fn collision_during_pause_is_counted_in_the_turn() {
        let (mut session, mut table) = playing(GameType::ThreeBall, &["p1", "p2"]);
        table.moving = [BallId::CUE].into_iter().collect();
        session.tick(&table);
        session.tick(&table);
        session.request_pause().unwrap();

        // the rolling cue knocks ball 2 while paused, then stops
        table.moving = [BallId(2)].into_iter().collect();
        session.tick(&table);
        assert_eq!(session.round().balls_in_motion(), 1);
        assert_eq!(session.players().active().name(), "p1", "turn still running");

        table.moving.clear();
        session.tick(&table);
        session.tick(&table);
        assert_eq!(session.round().balls_in_motion(), 0);
        assert_eq!(session.players().active().name(), "p2");
    }

    #[test]
    fn practice_settle_replaces_cue_ball() {
        let mut session =
            GameSession::new(SessionConfig::new(GameType::ThreeBall, &["p1"])).unwrap();
        let mut table = FakeTable::default();
        session.tick(&table);
        session.drain_placements();
        let ready = record_events(&mut session, EventKind::RoundReady);

        table.moving.insert(BallId::CUE);
        session.tick(&table);
        session.tick(&table);
        assert_eq!(session.round().balls_in_motion(), 0, "practice shots are not counted");
        table.moving.clear();
        session.tick(&table);

        let placed = session.drain_placements();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].ball, BallId::CUE);
        assert_eq!(ready.borrow().len(), 1);
        assert_eq!(session.players().active().score(), 0);
    }

    #[test]
    fn cue_retracts_after_strike_in_play() {
        let (mut session, mut table) = playing(GameType::ThreeBall, &["p1"]);
        session.aim_cue(glam::Vec2::new(1.0, 0.0));
        assert!(session.pull_cue(5.0));
        let shot = session.release_cue().expect("enough force gathered");
        assert!(shot.velocity.x > 0.0);

        table.moving.insert(BallId::CUE);
        session.tick(&table);
        assert!(session.cue().is_locked());
        assert!(session.cue().is_retracting());
        assert!(!session.pull_cue(2.0), "locked while balls are moving");

        run_ticks(&mut session, &table, 61);
        assert!(!session.cue().is_retracting());
        let rest = session.config().cue.rest_distance;
        assert!((session.cue().distance() - rest * 1.5).abs() < 0.01);

        table.moving.clear();
        run_ticks(&mut session, &table, 2);
        assert!(!session.cue().is_locked());
    }

    #[test]
    fn unknown_ball_contact_is_an_error() {
        let (mut session, _) = playing(GameType::ThreeBall, &["p1"]);
        assert_eq!(
            session.apply_contacts(&[TableContact::Pocketed(BallId(9))]),
            Err(SessionError::UnknownBall(BallId(9)))
        );
    }

    #[test]
    fn contact_batch_with_unknown_ball_records_nothing() {
        let (mut session, _) = playing(GameType::ThreeBall, &["p1"]);
        let batch = [
            TableContact::Pocketed(BallId(1)),
            TableContact::HitOut(BallId(2)),
            TableContact::Pocketed(BallId(9)),
        ];
        assert_eq!(session.apply_contacts(&batch), Err(SessionError::UnknownBall(BallId(9))));
        assert!(session.round().pocketed().is_empty());
        assert!(session.round().hit_out().is_empty());
    }

    #[test]
    fn reset_cancels_pending_deferrals() {
        let mut session =
            GameSession::new(SessionConfig::new(GameType::ThreeBall, &["p1"])).unwrap();
        let table = FakeTable::default();
        session.request_get_set().unwrap();
        assert_eq!(session.pending_deferrals(), 1);
        session.reset();
        assert_eq!(session.pending_deferrals(), 0);
        run_ticks(&mut session, &table, 400);
        assert_eq!(session.state(), GameState::Practice);
    }

    #[test]
    fn unknown_player_lookup_is_swallowed() {
        let (session, _) = playing(GameType::ThreeBall, &["p1"]);
        assert_eq!(session.player_score("ghost"), None);
    }
}
