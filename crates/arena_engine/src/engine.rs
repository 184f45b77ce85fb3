//! The match state machine.
//!
//! `AwaitingPlayers → InProgress(TurnStart → Action → TurnEnd) → Finished`.
//!
//! Every transition runs in two halves. The first half only reads: it loads
//! snapshots, checks authorization and preconditions, and works out the
//! complete write set. Any `?` lives there. The second half applies the
//! writes through a [`Changes`] buffer and cannot fail, so a refused action
//! never leaves partial state behind.
//!
//! The engine assumes the caller holds the match's exclusive section; see
//! `SystemDispatcher` in `arena_system`.

use std::collections::BTreeMap;

use arena_store::{Entity, EntityKind};
use tracing::{debug, info};

use crate::components::*;
use crate::error::{MatchError, MatchResult};
use crate::events::{FinishReason, GameEvent};
use crate::grid;
use crate::rules::{RulesConfig, UnitStats};
use crate::world::{CardView, Changes, MatchState, Outcome, Seat, World};

/// Longest accepted username, in bytes.
pub const MAX_USERNAME_LEN: usize = 32;

/// Runs transitions over a [`World`] with a fixed [`RulesConfig`].
#[derive(Debug, Default)]
pub struct MatchEngine {
    world: World,
    rules: RulesConfig,
}

impl MatchEngine {
    #[must_use]
    pub fn new(rules: RulesConfig) -> Self {
        Self {
            world: World::new(),
            rules,
        }
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[must_use]
    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// `InvalidState` for an empty or taken name, `OutOfBounds` for a name
    /// longer than [`MAX_USERNAME_LEN`] bytes.
    pub fn register(&self, username: &str) -> MatchResult<(Entity, Outcome)> {
        self.register_with(username, |_| Ok(()))
    }

    /// Creates a user, handing the new id to `bind` before anything is
    /// written. If `bind` fails the id is released and no user exists.
    ///
    /// # Errors
    ///
    /// As for [`register`](Self::register), or whatever `bind` returns.
    pub fn register_with(
        &self,
        username: &str,
        bind: impl FnOnce(Entity) -> MatchResult<()>,
    ) -> MatchResult<(Entity, Outcome)> {
        if username.is_empty() {
            return Err(MatchError::InvalidState("username must not be empty"));
        }
        if username.len() > MAX_USERNAME_LEN {
            return Err(MatchError::OutOfBounds("username is too long"));
        }
        if self.world.user_named(username).is_some() {
            return Err(MatchError::InvalidState("username already taken"));
        }

        let user = self.world.registry.create(EntityKind::User);
        if let Err(err) = bind(user) {
            self.world.registry.destroy(user);
            return Err(err);
        }
        let mut changes = Changes::new(None);
        changes.set(&self.world.tables.user, user, UserName(username.to_owned()));
        changes.emit(GameEvent::UserRegistered {
            user,
            username: username.to_owned(),
        });
        info!(%user, username, "user registered");
        Ok((user, changes.finish()))
    }

    /// Opens a match on `map` with `creator` as player one.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown creator, `OutOfBounds` for a map outside the
    /// rule limits, `InvalidState` if the creator is already playing.
    pub fn create_match(&self, creator: Entity, map: MapConfig) -> MatchResult<Outcome> {
        self.require_user(creator)?;
        if !self.rules.map_limits.accepts(&map) {
            return Err(MatchError::OutOfBounds("map dimensions outside limits"));
        }
        if self.world.active_match_of(creator).is_some() {
            return Err(MatchError::InvalidState("user is already in a match"));
        }

        let t = &self.world.tables;
        let match_id = self.world.registry.create(EntityKind::Match);
        let mut changes = Changes::new(Some(match_id));
        changes.set(&t.map_config, match_id, map);
        changes.set(&t.phase, match_id, MatchPhase::AwaitingPlayers);
        changes.set(&t.player_one, match_id, PlayerOne(creator));
        changes.set(&t.placed_cards, match_id, PlacedCards::default());
        changes.set(&t.cover, match_id, CoverPosition::default());
        let (x, y) = base_cell(&map, Seat::One);
        self.spawn_base(&mut changes, match_id, creator, x, y);
        changes.emit(GameEvent::MatchCreated { match_id, creator });

        info!(%match_id, %creator, width = map.width, height = map.height, "match created");
        Ok(changes.finish())
    }

    /// Seats `joiner` as player two and starts turn 1.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown user or match, `InvalidState` if the match
    /// is not open, the joiner created it, or the joiner is already playing.
    pub fn join_match(&self, match_id: Entity, joiner: Entity) -> MatchResult<Outcome> {
        self.require_user(joiner)?;
        let state = self.world.match_state(match_id)?;
        if state.phase != MatchPhase::AwaitingPlayers {
            return Err(MatchError::InvalidState("match is not open"));
        }
        if joiner == state.player_one {
            return Err(MatchError::InvalidState("cannot join own match"));
        }
        if self.world.active_match_of(joiner).is_some() {
            return Err(MatchError::InvalidState("user is already in a match"));
        }

        let t = &self.world.tables;
        let mana = self.rules.mana.allotment(1);
        let mut changes = Changes::new(Some(match_id));
        changes.set(&t.player_two, match_id, PlayerTwo(joiner));
        changes.set(&t.current_turn, match_id, CurrentTurn(1));
        changes.set(&t.current_player, match_id, CurrentPlayer(state.player_one));
        changes.set(&t.current_mana, match_id, CurrentMana(mana));
        let (x, y) = base_cell(&state.map, Seat::Two);
        self.spawn_base(&mut changes, match_id, joiner, x, y);
        changes.set(&t.phase, match_id, MatchPhase::ACTION);
        changes.emit(GameEvent::PlayerJoined {
            match_id,
            player: joiner,
        });

        info!(%match_id, player = %joiner, "match started");
        Ok(changes.finish())
    }

    /// Summons a new card of `unit` on `(x, y)`.
    ///
    /// # Errors
    ///
    /// Turn checks as for every action, then `InvalidState` for a base or
    /// unknown unit, `OutOfBounds` off the board, `Occupied`, and
    /// `ResourceExhausted` at the placement cap or without mana.
    pub fn place_card(
        &self,
        match_id: Entity,
        actor: Entity,
        unit: UnitType,
        x: u32,
        y: u32,
    ) -> MatchResult<Outcome> {
        let (state, seat) = self.load_turn(match_id, actor)?;
        if unit == UnitType::Base {
            return Err(MatchError::InvalidState("base cards cannot be placed"));
        }
        let stats = *self
            .rules
            .unit(unit)
            .ok_or(MatchError::InvalidState("unit is not in the catalog"))?;
        if !state.map.contains(x, y) {
            return Err(MatchError::OutOfBounds("cell is off the board"));
        }
        if self.world.occupant(match_id, x, y).is_some() {
            return Err(MatchError::Occupied { x, y });
        }
        if state.placed_by(seat) >= state.map.per_player_cap()
            || state.placed.total() >= state.map.max_placed_cards
        {
            return Err(MatchError::ResourceExhausted("placement cap reached"));
        }
        let mana = pay(&state, self.rules.costs.summon)?;

        let t = &self.world.tables;
        let mut changes = Changes::new(Some(match_id));
        let card = self.spawn_card(&mut changes, match_id, actor, &stats, x, y);
        let mut placed = state.placed;
        match seat {
            Seat::One => placed.p1_cards += 1,
            Seat::Two => placed.p2_cards += 1,
        }
        changes.set(&t.placed_cards, match_id, placed);
        changes.set(&t.current_mana, match_id, CurrentMana(mana));
        changes.emit(GameEvent::CardPlaced {
            card,
            owner: actor,
            unit,
            x,
            y,
        });

        debug!(%match_id, %card, %unit, x, y, mana, "card placed");
        Ok(changes.finish())
    }

    /// Walks `card` to `(x, y)`.
    ///
    /// # Errors
    ///
    /// Card checks, then `OutOfBounds` off the board or beyond the card's
    /// movement speed, `Occupied`, and `ResourceExhausted` without mana.
    pub fn move_card(
        &self,
        match_id: Entity,
        actor: Entity,
        card: Entity,
        x: u32,
        y: u32,
    ) -> MatchResult<Outcome> {
        let (state, _) = self.load_turn(match_id, actor)?;
        let view = self.ready_card(&state, actor, card)?;
        self.check_step(&state, &view, x, y)?;
        let mana = pay(&state, self.rules.costs.movement)?;

        let t = &self.world.tables;
        let mut changes = Changes::new(Some(match_id));
        changes.set(&t.position, card, Position::placed(match_id, x, y));
        changes.set(&t.action_ready, card, ActionReady(false));
        changes.set(&t.current_mana, match_id, CurrentMana(mana));
        changes.emit(GameEvent::CardMoved {
            card,
            from: view.cell(),
            to: (x, y),
        });

        debug!(%match_id, %card, x, y, mana, "card moved");
        Ok(changes.finish())
    }

    /// Strikes an adjacent opponent card with the attacker's damage.
    ///
    /// # Errors
    ///
    /// Card checks, `NotFound` for a target outside the match, `InvalidState`
    /// for a friendly target, `OutOfBounds` unless the target is at Manhattan
    /// distance 1, and `ResourceExhausted` without mana.
    pub fn attack(
        &self,
        match_id: Entity,
        actor: Entity,
        attacker: Entity,
        target: Entity,
    ) -> MatchResult<Outcome> {
        let (state, _) = self.load_turn(match_id, actor)?;
        let view = self.ready_card(&state, actor, attacker)?;
        let victim = self.enemy_card(&state, actor, target)?;
        if grid::manhattan(grid::cell(view.x, view.y), grid::cell(victim.x, victim.y)) != 1 {
            return Err(MatchError::OutOfBounds("target is not adjacent"));
        }
        let mana = pay(&state, self.rules.costs.attack)?;
        let hits = self.covered(&state, actor, vec![(target, view.attack_damage)]);

        let mut changes = Changes::new(Some(match_id));
        self.spend(&mut changes, &state, attacker, mana);
        self.resolve_hits(&mut changes, &state, actor, hits);

        debug!(%match_id, %attacker, %target, mana, "attack resolved");
        Ok(changes.finish())
    }

    /// Ends the actor's turn and starts the opponent's.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Unauthorized` and `InvalidState` as for every action.
    pub fn end_turn(&self, match_id: Entity, actor: Entity) -> MatchResult<Outcome> {
        let (state, seat) = self.load_turn(match_id, actor)?;
        let next_seat = seat.other();
        let next_player = state
            .player(next_seat)
            .ok_or(MatchError::InvalidState("match has no opponent"))?;
        let turn = state.turn + 1;
        let mana = self.rules.mana.allotment(turn);

        let t = &self.world.tables;
        let mut changes = Changes::new(Some(match_id));
        changes.set(&t.phase, match_id, MatchPhase::InProgress(TurnPhase::TurnEnd));
        changes.set(&t.current_turn, match_id, CurrentTurn(turn));
        changes.set(&t.current_player, match_id, CurrentPlayer(next_player));
        changes.set(&t.current_mana, match_id, CurrentMana(mana));
        changes.set(&t.phase, match_id, MatchPhase::InProgress(TurnPhase::TurnStart));
        self.start_turn(&mut changes, &state, next_seat, next_player);
        changes.set(&t.phase, match_id, MatchPhase::ACTION);
        changes.emit(GameEvent::TurnEnded {
            match_id,
            turn,
            next_player,
            mana,
        });

        debug!(%match_id, turn, player = %next_player, mana, "turn started");
        Ok(changes.finish())
    }

    /// Concedes a running match; the opponent wins.
    ///
    /// May be called by either player, on any turn.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown match, `Unauthorized` for a non-participant,
    /// `InvalidState` unless the match is in progress.
    pub fn surrender(&self, match_id: Entity, actor: Entity) -> MatchResult<Outcome> {
        let state = self.world.match_state(match_id)?;
        let seat = state
            .seat_of(actor)
            .ok_or(MatchError::Unauthorized("not a player of this match"))?;
        if !matches!(state.phase, MatchPhase::InProgress(_)) {
            return Err(MatchError::InvalidState("match is not in progress"));
        }
        let winner = state
            .player(seat.other())
            .ok_or(MatchError::InvalidState("match has no opponent"))?;

        let mut changes = Changes::new(Some(match_id));
        self.finish(&mut changes, match_id, winner, FinishReason::Surrender);
        Ok(changes.finish())
    }

    // ── shared checks ───────────────────────────────────────────────────

    fn require_user(&self, user: Entity) -> MatchResult<()> {
        if self.world.registry.is(user, EntityKind::User) {
            Ok(())
        } else {
            Err(MatchError::missing(EntityKind::User, user))
        }
    }

    /// Loads a match and checks that `actor` may act in it right now.
    pub(crate) fn load_turn(
        &self,
        match_id: Entity,
        actor: Entity,
    ) -> MatchResult<(MatchState, Seat)> {
        let state = self.world.match_state(match_id)?;
        let seat = state
            .seat_of(actor)
            .ok_or(MatchError::Unauthorized("not a player of this match"))?;
        if state.phase != MatchPhase::ACTION {
            return Err(MatchError::InvalidState("match is not in progress"));
        }
        if state.current_player != Some(actor) {
            return Err(MatchError::Unauthorized("not your turn"));
        }
        Ok((state, seat))
    }

    /// Loads one of the actor's own non-base cards that has not acted yet.
    pub(crate) fn ready_card(
        &self,
        state: &MatchState,
        actor: Entity,
        card: Entity,
    ) -> MatchResult<CardView> {
        let view = self.world.card(card)?;
        if view.match_id != state.id {
            return Err(MatchError::missing(EntityKind::Card, card));
        }
        if view.owner != actor {
            return Err(MatchError::Unauthorized("card belongs to another player"));
        }
        if view.is_base {
            return Err(MatchError::InvalidState("base cards cannot act"));
        }
        if !view.action_ready {
            return Err(MatchError::InvalidState("card already acted this turn"));
        }
        Ok(view)
    }

    /// Loads an opponent card of the same match.
    pub(crate) fn enemy_card(
        &self,
        state: &MatchState,
        actor: Entity,
        card: Entity,
    ) -> MatchResult<CardView> {
        let view = self.world.card(card)?;
        if view.match_id != state.id {
            return Err(MatchError::missing(EntityKind::Card, card));
        }
        if view.owner == actor {
            return Err(MatchError::InvalidState("target is a friendly card"));
        }
        Ok(view)
    }

    /// Checks a walk or dodge of `view` to `(x, y)`.
    pub(crate) fn check_step(
        &self,
        state: &MatchState,
        view: &CardView,
        x: u32,
        y: u32,
    ) -> MatchResult<()> {
        if !state.map.contains(x, y) {
            return Err(MatchError::OutOfBounds("cell is off the board"));
        }
        if grid::manhattan(grid::cell(view.x, view.y), grid::cell(x, y)) > view.movement_speed {
            return Err(MatchError::OutOfBounds("beyond movement range"));
        }
        if self.world.occupant(state.id, x, y).is_some() {
            return Err(MatchError::Occupied { x, y });
        }
        Ok(())
    }

    /// Opponent cards standing on `cells`.
    pub(crate) fn enemies_on(
        &self,
        state: &MatchState,
        actor: Entity,
        cells: &[(u32, u32)],
    ) -> Vec<Entity> {
        let t = &self.world.tables;
        cells
            .iter()
            .filter_map(|&(x, y)| self.world.occupant(state.id, x, y))
            .filter(|card| t.owned_by.get(*card).is_some_and(|owner| owner.0 != actor))
            .collect()
    }

    /// Applies the opponent's cover to a list of hits.
    ///
    /// A hit on an opponent card within cover range of the opponent's
    /// covering card lands on the covering card instead.
    pub(crate) fn covered(
        &self,
        state: &MatchState,
        actor: Entity,
        hits: Vec<(Entity, u32)>,
    ) -> Vec<(Entity, u32)> {
        let Some(seat) = state.seat_of(actor) else {
            return hits;
        };
        let Some(slot) = state.cover_of(seat.other()) else {
            return hits;
        };
        let Ok(guard) = self.world.card(slot.card) else {
            return hits;
        };
        let range = self.rules.abilities.cover_range;
        hits.into_iter()
            .map(|(target, damage)| match self.world.card(target) {
                Ok(victim)
                    if victim.id != guard.id
                        && victim.owner == slot.player
                        && grid::manhattan(
                            grid::cell(guard.x, guard.y),
                            grid::cell(victim.x, victim.y),
                        ) <= range =>
                {
                    (guard.id, damage)
                }
                _ => (target, damage),
            })
            .collect()
    }

    // ── writes ──────────────────────────────────────────────────────────

    /// Consumes the card's action and sets the remaining mana.
    pub(crate) fn spend(&self, changes: &mut Changes, state: &MatchState, card: Entity, mana: u32) {
        let t = &self.world.tables;
        changes.set(&t.action_ready, card, ActionReady(false));
        changes.set(&t.current_mana, state.id, CurrentMana(mana));
    }

    /// Deals damage, removes dead cards, and ends the match when the
    /// opponent's base falls.
    pub(crate) fn resolve_hits(
        &self,
        changes: &mut Changes,
        state: &MatchState,
        actor: Entity,
        hits: Vec<(Entity, u32)>,
    ) {
        let mut totals: BTreeMap<Entity, u32> = BTreeMap::new();
        for (card, damage) in hits {
            let total = totals.entry(card).or_default();
            *total = total.saturating_add(damage);
        }

        let t = &self.world.tables;
        let mut base_destroyed = false;
        for (card, damage) in totals {
            let Some(CurrentHp(previous)) = t.current_hp.get(card) else {
                continue;
            };
            let current = previous.saturating_sub(damage);
            changes.set(&t.current_hp, card, CurrentHp(current));
            changes.emit(GameEvent::CardDamaged {
                card,
                previous,
                current,
            });
            if current == 0 {
                let is_base = t.is_base.get(card).is_some_and(|b| b.0);
                let owner = t.owned_by.get(card).map(|o| o.0);
                self.destroy_card(changes, state.id, card);
                base_destroyed |= is_base && owner != Some(actor);
            }
        }

        if base_destroyed {
            self.finish(changes, state.id, actor, FinishReason::BaseDestroyed);
        }
    }

    /// Removes every row of a card and retires its id.
    fn destroy_card(&self, changes: &mut Changes, match_id: Entity, card: Entity) {
        let t = &self.world.tables;
        if let Some(mut cover) = t.cover.get(match_id) {
            let before = cover;
            for slot in [&mut cover.one, &mut cover.two] {
                if slot.is_some_and(|s| s.card == card) {
                    *slot = None;
                }
            }
            if cover != before {
                changes.set(&t.cover, match_id, cover);
            }
        }

        changes.remove(&t.position, card);
        changes.remove(&t.owned_by, card);
        changes.remove(&t.used_in, card);
        changes.remove(&t.is_base, card);
        changes.remove(&t.unit_type, card);
        changes.remove(&t.ability_type, card);
        changes.remove(&t.attack_damage, card);
        changes.remove(&t.max_hp, card);
        changes.remove(&t.current_hp, card);
        changes.remove(&t.movement_speed, card);
        changes.remove(&t.action_ready, card);
        changes.remove(&t.sidestep, card);
        self.world.registry.destroy(card);
        changes.emit(GameEvent::CardDestroyed { card });
        debug!(%match_id, %card, "card destroyed");
    }

    fn finish(&self, changes: &mut Changes, match_id: Entity, winner: Entity, reason: FinishReason) {
        changes.set(&self.world.tables.phase, match_id, MatchPhase::Finished { winner });
        changes.emit(GameEvent::MatchFinished {
            match_id,
            winner,
            reason,
        });
        info!(%match_id, %winner, ?reason, "match finished");
    }

    /// Turn-start upkeep for the player taking over.
    fn start_turn(&self, changes: &mut Changes, state: &MatchState, seat: Seat, player: Entity) {
        let t = &self.world.tables;

        if let Some(slot) = state.cover_of(seat) {
            let mut cover = state.cover;
            match seat {
                Seat::One => cover.one = None,
                Seat::Two => cover.two = None,
            }
            changes.set(&t.cover, state.id, cover);
            changes.emit(GameEvent::CoverExpired { card: slot.card });
        }

        let own = self
            .world
            .cards_in(state.id)
            .into_iter()
            .filter(|card| t.owned_by.get(*card) == Some(OwnedBy(player)));
        for card in own {
            if t.is_base.get(card).is_some_and(|b| b.0) {
                continue;
            }
            changes.set(&t.action_ready, card, ActionReady(true));
            if let (Some(AbilityType::Sidestep), Some(at)) =
                (t.ability_type.get(card), t.position.get(card))
            {
                changes.set(&t.sidestep, card, SidestepInitialPosition::saved(at.x, at.y));
            }
        }
    }

    fn spawn_base(&self, changes: &mut Changes, match_id: Entity, owner: Entity, x: u32, y: u32) {
        let stats = UnitStats {
            unit: UnitType::Base,
            attack_damage: 0,
            max_hp: self.rules.base_max_hp,
            movement_speed: 0,
            ability: None,
        };
        let card = self.spawn_card(changes, match_id, owner, &stats, x, y);
        let t = &self.world.tables;
        changes.set(&t.is_base, card, IsBase(true));
        changes.set(&t.action_ready, card, ActionReady(false));
    }

    fn spawn_card(
        &self,
        changes: &mut Changes,
        match_id: Entity,
        owner: Entity,
        stats: &UnitStats,
        x: u32,
        y: u32,
    ) -> Entity {
        let t = &self.world.tables;
        let card = self.world.registry.create(EntityKind::Card);
        changes.set(&t.owned_by, card, OwnedBy(owner));
        changes.set(&t.used_in, card, UsedIn(match_id));
        changes.set(&t.is_base, card, IsBase(false));
        changes.set(&t.unit_type, card, stats.unit);
        if let Some(ability) = stats.ability {
            changes.set(&t.ability_type, card, ability);
        }
        if stats.ability == Some(AbilityType::Sidestep) {
            changes.set(&t.sidestep, card, SidestepInitialPosition::saved(x, y));
        }
        changes.set(&t.attack_damage, card, AttackDamage(stats.attack_damage));
        changes.set(&t.max_hp, card, MaxHp(stats.max_hp));
        changes.set(&t.current_hp, card, CurrentHp(stats.max_hp));
        changes.set(&t.movement_speed, card, MovementSpeed(stats.movement_speed));
        changes.set(&t.action_ready, card, ActionReady(true));
        changes.set(&t.position, card, Position::placed(match_id, x, y));
        card
    }
}

/// Home cell of a seat: centre of the first or last row.
#[must_use]
pub fn base_cell(map: &MapConfig, seat: Seat) -> (u32, u32) {
    match seat {
        Seat::One => (map.width / 2, 0),
        Seat::Two => (map.width / 2, map.height.saturating_sub(1)),
    }
}

/// Remaining mana after paying `cost`.
pub(crate) fn pay(state: &MatchState, cost: u32) -> MatchResult<u32> {
    state
        .mana
        .checked_sub(cost)
        .ok_or(MatchError::ResourceExhausted("not enough mana"))
}
