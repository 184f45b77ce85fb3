//! The table set, per-match snapshots, and the change buffer transitions
//! write through.

use std::collections::{BTreeSet, HashMap};

use arena_store::{Component, ComponentStore, ComponentTypeId, Entity, EntityKind, EntityRegistry};
use serde::{Deserialize, Serialize};

use crate::components::*;
use crate::error::{MatchError, MatchResult};
use crate::events::GameEvent;

/// Every game table.
///
/// Indexed tables: `user` (unique names), `phase` (open-match listing),
/// `player_one`/`player_two` (match of a user), `owned_by`, `used_in`
/// (cards of a match) and `position` (cell occupancy).
#[derive(Debug)]
pub struct Tables {
    pub user: ComponentStore<UserName>,
    pub map_config: ComponentStore<MapConfig>,
    pub phase: ComponentStore<MatchPhase>,
    pub player_one: ComponentStore<PlayerOne>,
    pub player_two: ComponentStore<PlayerTwo>,
    pub current_turn: ComponentStore<CurrentTurn>,
    pub current_player: ComponentStore<CurrentPlayer>,
    pub current_mana: ComponentStore<CurrentMana>,
    pub placed_cards: ComponentStore<PlacedCards>,
    pub cover: ComponentStore<CoverPosition>,
    pub owned_by: ComponentStore<OwnedBy>,
    pub used_in: ComponentStore<UsedIn>,
    pub is_base: ComponentStore<IsBase>,
    pub unit_type: ComponentStore<UnitType>,
    pub ability_type: ComponentStore<AbilityType>,
    pub attack_damage: ComponentStore<AttackDamage>,
    pub max_hp: ComponentStore<MaxHp>,
    pub current_hp: ComponentStore<CurrentHp>,
    pub movement_speed: ComponentStore<MovementSpeed>,
    pub action_ready: ComponentStore<ActionReady>,
    pub position: ComponentStore<Position>,
    pub sidestep: ComponentStore<SidestepInitialPosition>,
}

impl Tables {
    #[must_use]
    pub fn new() -> Self {
        Self {
            user: ComponentStore::indexed(),
            map_config: ComponentStore::new(),
            phase: ComponentStore::indexed(),
            player_one: ComponentStore::indexed(),
            player_two: ComponentStore::indexed(),
            current_turn: ComponentStore::new(),
            current_player: ComponentStore::new(),
            current_mana: ComponentStore::new(),
            placed_cards: ComponentStore::new(),
            cover: ComponentStore::new(),
            owned_by: ComponentStore::indexed(),
            used_in: ComponentStore::indexed(),
            is_base: ComponentStore::new(),
            unit_type: ComponentStore::new(),
            ability_type: ComponentStore::new(),
            attack_damage: ComponentStore::new(),
            max_hp: ComponentStore::new(),
            current_hp: ComponentStore::new(),
            movement_speed: ComponentStore::new(),
            action_ready: ComponentStore::new(),
            position: ComponentStore::indexed(),
            sidestep: ComponentStore::new(),
        }
    }
}

impl Default for Tables {
    fn default() -> Self {
        Self::new()
    }
}

/// One of the two places at a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Seat {
    One,
    Two,
}

impl Seat {
    #[must_use]
    pub fn other(self) -> Seat {
        match self {
            Seat::One => Seat::Two,
            Seat::Two => Seat::One,
        }
    }
}

/// All match-level rows of one match, read at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    pub id: Entity,
    pub map: MapConfig,
    pub phase: MatchPhase,
    pub player_one: Entity,
    pub player_two: Option<Entity>,
    pub turn: u32,
    pub current_player: Option<Entity>,
    pub mana: u32,
    pub placed: PlacedCards,
    pub cover: CoverPosition,
}

impl MatchState {
    #[must_use]
    pub fn seat_of(&self, user: Entity) -> Option<Seat> {
        if user == self.player_one {
            Some(Seat::One)
        } else if Some(user) == self.player_two {
            Some(Seat::Two)
        } else {
            None
        }
    }

    #[must_use]
    pub fn player(&self, seat: Seat) -> Option<Entity> {
        match seat {
            Seat::One => Some(self.player_one),
            Seat::Two => self.player_two,
        }
    }

    #[must_use]
    pub fn placed_by(&self, seat: Seat) -> u32 {
        match seat {
            Seat::One => self.placed.p1_cards,
            Seat::Two => self.placed.p2_cards,
        }
    }

    #[must_use]
    pub fn cover_of(&self, seat: Seat) -> Option<CoverSlot> {
        match seat {
            Seat::One => self.cover.one,
            Seat::Two => self.cover.two,
        }
    }
}

/// All rows of one card, read at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub id: Entity,
    pub owner: Entity,
    pub match_id: Entity,
    pub unit: UnitType,
    pub ability: Option<AbilityType>,
    pub is_base: bool,
    pub attack_damage: u32,
    pub max_hp: u32,
    pub current_hp: u32,
    pub movement_speed: u32,
    pub action_ready: bool,
    pub x: u32,
    pub y: u32,
}

impl CardView {
    #[must_use]
    pub fn cell(&self) -> (u32, u32) {
        (self.x, self.y)
    }
}

/// Registry plus tables: the whole game state.
#[derive(Debug, Default)]
pub struct World {
    pub registry: EntityRegistry,
    pub tables: Tables,
}

impl World {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a match.
    ///
    /// # Errors
    ///
    /// [`MatchError::NotFound`] if `match_id` is not a live match.
    pub fn match_state(&self, match_id: Entity) -> MatchResult<MatchState> {
        let missing = || MatchError::missing(EntityKind::Match, match_id);
        if !self.registry.is(match_id, EntityKind::Match) {
            return Err(missing());
        }
        let t = &self.tables;
        Ok(MatchState {
            id: match_id,
            map: t.map_config.get(match_id).ok_or_else(missing)?,
            phase: t.phase.get(match_id).ok_or_else(missing)?,
            player_one: t.player_one.get(match_id).ok_or_else(missing)?.0,
            player_two: t.player_two.get(match_id).map(|p| p.0),
            turn: t.current_turn.get(match_id).map_or(0, |turn| turn.0),
            current_player: t.current_player.get(match_id).map(|p| p.0),
            mana: t.current_mana.get(match_id).map_or(0, |mana| mana.0),
            placed: t.placed_cards.get(match_id).unwrap_or_default(),
            cover: t.cover.get(match_id).unwrap_or_default(),
        })
    }

    /// Snapshot of a card.
    ///
    /// # Errors
    ///
    /// [`MatchError::NotFound`] if `card` is not a live, placed card.
    pub fn card(&self, card: Entity) -> MatchResult<CardView> {
        let missing = || MatchError::missing(EntityKind::Card, card);
        if !self.registry.is(card, EntityKind::Card) {
            return Err(missing());
        }
        let t = &self.tables;
        let position = t.position.get(card).filter(|p| p.placed).ok_or_else(missing)?;
        Ok(CardView {
            id: card,
            owner: t.owned_by.get(card).ok_or_else(missing)?.0,
            match_id: t.used_in.get(card).ok_or_else(missing)?.0,
            unit: t.unit_type.get(card).ok_or_else(missing)?,
            ability: t.ability_type.get(card),
            is_base: t.is_base.get(card).is_some_and(|b| b.0),
            attack_damage: t.attack_damage.get(card).map_or(0, |v| v.0),
            max_hp: t.max_hp.get(card).map_or(0, |v| v.0),
            current_hp: t.current_hp.get(card).map_or(0, |v| v.0),
            movement_speed: t.movement_speed.get(card).map_or(0, |v| v.0),
            action_ready: t.action_ready.get(card).is_some_and(|v| v.0),
            x: position.x,
            y: position.y,
        })
    }

    /// The card standing on `(x, y)` of a match, if any.
    #[must_use]
    pub fn occupant(&self, match_id: Entity, x: u32, y: u32) -> Option<Entity> {
        self.tables
            .position
            .keys_with_value(&Position::placed(match_id, x, y))
            .into_iter()
            .next()
    }

    /// Every live card of a match.
    #[must_use]
    pub fn cards_in(&self, match_id: Entity) -> BTreeSet<Entity> {
        self.tables.used_in.keys_with_value(&UsedIn(match_id))
    }

    /// The user registered under `name`.
    #[must_use]
    pub fn user_named(&self, name: &str) -> Option<Entity> {
        self.tables
            .user
            .keys_with_value(&UserName(name.to_owned()))
            .into_iter()
            .next()
    }

    /// The unfinished match `user` plays in, if any.
    #[must_use]
    pub fn active_match_of(&self, user: Entity) -> Option<Entity> {
        let t = &self.tables;
        t.player_one
            .keys_with_value(&PlayerOne(user))
            .into_iter()
            .chain(t.player_two.keys_with_value(&PlayerTwo(user)))
            .find(|m| t.phase.get(*m).is_some_and(|phase| !phase.is_finished()))
    }
}

/// How a row changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Change {
    Set(RowValue),
    Removed,
}

/// One table write, as replayed by persistence and external readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    pub table: ComponentTypeId,
    pub table_name: String,
    pub entity: Entity,
    pub change: Change,
}

/// Result of an accepted transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// The match the transition ran in; `None` for registration.
    pub match_id: Option<Entity>,
    pub events: Vec<GameEvent>,
    /// Final write per (table, entity), in first-write order.
    pub deltas: Vec<Delta>,
}

/// Write-through buffer for a transition.
///
/// Writes hit the stores immediately; the buffer records the last write per
/// (table, entity) so the outcome carries one delta per row.
#[derive(Debug, Default)]
pub(crate) struct Changes {
    match_id: Option<Entity>,
    deltas: Vec<Delta>,
    slots: HashMap<(ComponentTypeId, Entity), usize>,
    events: Vec<GameEvent>,
}

impl Changes {
    pub(crate) fn new(match_id: Option<Entity>) -> Self {
        Self {
            match_id,
            ..Self::default()
        }
    }

    pub(crate) fn set<C>(&mut self, store: &ComponentStore<C>, entity: Entity, value: C)
    where
        C: Component + Into<RowValue>,
    {
        store.set(entity, value.clone());
        self.record(C::component_type_id(), C::type_name(), entity, Change::Set(value.into()));
    }

    pub(crate) fn remove<C: Component>(&mut self, store: &ComponentStore<C>, entity: Entity) {
        if store.remove(entity).is_some() {
            self.record(C::component_type_id(), C::type_name(), entity, Change::Removed);
        }
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(crate) fn finish(self) -> Outcome {
        Outcome {
            match_id: self.match_id,
            events: self.events,
            deltas: self.deltas,
        }
    }

    fn record(&mut self, table: ComponentTypeId, name: &str, entity: Entity, change: Change) {
        match self.slots.get(&(table, entity)) {
            Some(&slot) => self.deltas[slot].change = change,
            None => {
                self.slots.insert((table, entity), self.deltas.len());
                self.deltas.push(Delta {
                    table,
                    table_name: name.to_owned(),
                    entity,
                    change,
                });
            }
        }
    }
}
