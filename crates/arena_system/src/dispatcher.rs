//! Routes actions from authenticated callers into the engine.
//!
//! Each match has its own mutex, so at most one transition runs per match
//! while different matches proceed in parallel. Lobby actions (register,
//! create, join) also take one shared lobby lock: they check conditions
//! that span matches, such as unique usernames and one active match per
//! user. Lock order is lobby, then match.

use std::sync::{Arc, Mutex, PoisonError};

use arena_engine::components::MatchPhase;
use arena_engine::{BoardView, GameEvent, MatchEngine, MatchError, MatchResult, OpenMatch, Outcome};
use arena_net::Action;
use arena_store::{Entity, EntityKind};
use dashmap::DashMap;
use tracing::debug;

use crate::identity::{IdentityProvider, SessionDirectory};

/// Serializes transitions per match and binds credentials to users.
#[derive(Debug)]
pub struct SystemDispatcher<I = SessionDirectory> {
    engine: MatchEngine,
    identity: I,
    match_locks: DashMap<Entity, Arc<Mutex<()>>>,
    lobby: Mutex<()>,
}

impl Default for SystemDispatcher {
    fn default() -> Self {
        Self::new(MatchEngine::default(), SessionDirectory::new())
    }
}

impl<I: IdentityProvider> SystemDispatcher<I> {
    #[must_use]
    pub fn new(engine: MatchEngine, identity: I) -> Self {
        Self {
            engine,
            identity,
            match_locks: DashMap::new(),
            lobby: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    #[must_use]
    pub fn identity(&self) -> &I {
        &self.identity
    }

    /// Runs one action on behalf of the holder of `credential`.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for an unknown credential or a caller who is not
    /// seated in the target match, `InvalidState` when registering an
    /// already bound credential, and every engine rejection.
    pub fn dispatch(&self, credential: &str, action: Action) -> MatchResult<Outcome> {
        if let Action::Register { username } = &action {
            return self.register(credential, username);
        }

        let user = self
            .identity
            .resolve(credential)
            .ok_or(MatchError::Unauthorized("unknown credential"))?;
        let system = action.system_name();

        let outcome = match action {
            Action::CreateMatch { map } => {
                let _lobby = self.lobby.lock().unwrap_or_else(PoisonError::into_inner);
                self.engine.create_match(user, map)
            }
            Action::JoinMatch { match_id } => {
                let _lobby = self.lobby.lock().unwrap_or_else(PoisonError::into_inner);
                self.exclusive(match_id, || self.engine.join_match(match_id, user))
            }
            action => {
                let Some(match_id) = action.match_id() else {
                    return Err(MatchError::InvalidState("action does not target a match"));
                };
                self.exclusive(match_id, || {
                    self.require_seat(match_id, user)?;
                    self.apply(match_id, user, action)
                })
            }
        }?;

        debug!(system, %user, match_id = ?outcome.match_id, "action accepted");
        let finished = outcome
            .events
            .iter()
            .any(|event| matches!(event, GameEvent::MatchFinished { .. }));
        if let (true, Some(match_id)) = (finished, outcome.match_id) {
            self.match_locks.remove(&match_id);
        }
        Ok(outcome)
    }

    /// Current board of a match. Reads do not take the match lock.
    ///
    /// # Errors
    ///
    /// `NotFound` if the match does not exist.
    pub fn board(&self, match_id: Entity) -> MatchResult<BoardView> {
        self.engine.board(match_id)
    }

    /// Matches waiting for a second player.
    #[must_use]
    pub fn open_matches(&self) -> Vec<OpenMatch> {
        self.engine.open_matches()
    }

    fn register(&self, credential: &str, username: &str) -> MatchResult<Outcome> {
        let _lobby = self.lobby.lock().unwrap_or_else(PoisonError::into_inner);
        if self.identity.resolve(credential).is_some() {
            return Err(MatchError::InvalidState("credential already registered"));
        }
        let (user, outcome) = self.engine.register_with(username, |user| {
            if self.identity.bind(credential, user) {
                Ok(())
            } else {
                Err(MatchError::InvalidState("credential already registered"))
            }
        })?;
        debug!(%user, "credential bound");
        Ok(outcome)
    }

    fn require_seat(&self, match_id: Entity, user: Entity) -> MatchResult<()> {
        let state = self.engine.world().match_state(match_id)?;
        if state.seat_of(user).is_none() {
            return Err(MatchError::Unauthorized("not a player of this match"));
        }
        Ok(())
    }

    fn apply(&self, match_id: Entity, user: Entity, action: Action) -> MatchResult<Outcome> {
        if let Some((card, ability)) = action.ability() {
            return self.engine.use_ability(match_id, user, card, ability);
        }
        match action {
            Action::PlaceCard { unit, x, y, .. } => {
                self.engine.place_card(match_id, user, unit, x, y)
            }
            Action::MoveCard { card, x, y, .. } => {
                self.engine.move_card(match_id, user, card, x, y)
            }
            Action::Attack {
                attacker, target, ..
            } => self.engine.attack(match_id, user, attacker, target),
            Action::EndTurn { .. } => self.engine.end_turn(match_id, user),
            Action::Surrender { .. } => self.engine.surrender(match_id, user),
            _ => Err(MatchError::InvalidState("action does not target a match")),
        }
    }

    /// Runs `f` holding the lock of an existing match. Lock entries are only
    /// ever created for live matches; finished ones never change again, so
    /// `f` runs unlocked and reports the phase itself.
    fn exclusive<T>(
        &self,
        match_id: Entity,
        f: impl FnOnce() -> MatchResult<T>,
    ) -> MatchResult<T> {
        let world = self.engine.world();
        if !world.registry.is(match_id, EntityKind::Match) {
            return Err(MatchError::NotFound {
                kind: EntityKind::Match,
                id: match_id,
            });
        }
        if matches!(world.tables.phase.get(match_id), Some(MatchPhase::Finished { .. })) {
            return f();
        }
        let lock = Arc::clone(self.match_locks.entry(match_id).or_default().value());
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}
