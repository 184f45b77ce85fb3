//! Game tables.
//!
//! Each type here is the value of one table. Keys are always an
//! [`Entity`]: a user, a match or a card depending on the table.

use std::fmt;

use arena_store::{Component, Entity};
use serde::{Deserialize, Serialize};

macro_rules! scalar_table {
    ($($(#[$meta:meta])* $name:ident($ty:ty);)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            pub struct $name(pub $ty);
        )*
    };
}

scalar_table! {
    /// Turn counter of a match. Starts at 1 when the second player joins.
    CurrentTurn(u32);
    /// Mana left to the current player this turn.
    CurrentMana(u32);
    /// The user who created the match.
    PlayerOne(Entity);
    /// The user who joined the match.
    PlayerTwo(Entity);
    /// The user whose turn it is.
    CurrentPlayer(Entity);
    /// The user a card belongs to.
    OwnedBy(Entity);
    /// The match a card was created in. Never rewritten.
    UsedIn(Entity);
    IsBase(bool);
    AttackDamage(u32);
    MaxHp(u32);
    CurrentHp(u32);
    MovementSpeed(u32);
    /// Set at the start of the owner's turn, consumed by any card action.
    ActionReady(bool);
}

/// Registered name of a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserName(pub String);

/// Board dimensions and the total placement budget of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapConfig {
    pub width: u32,
    pub height: u32,
    pub max_placed_cards: u32,
}

impl MapConfig {
    /// Returns `true` if `(x, y)` lies on the board.
    #[must_use]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Cards each player may place.
    #[must_use]
    pub fn per_player_cap(&self) -> u32 {
        self.max_placed_cards / 2
    }
}

/// Sub-state of a running match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TurnPhase {
    TurnStart,
    Action,
    TurnEnd,
}

/// Lifecycle state of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchPhase {
    AwaitingPlayers,
    InProgress(TurnPhase),
    Finished { winner: Entity },
}

impl MatchPhase {
    /// The resting state of a match between actions.
    pub const ACTION: MatchPhase = MatchPhase::InProgress(TurnPhase::Action);

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }
}

/// Cards placed so far by each seat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacedCards {
    pub p1_cards: u32,
    pub p2_cards: u32,
}

impl PlacedCards {
    #[must_use]
    pub fn total(&self) -> u32 {
        self.p1_cards + self.p2_cards
    }
}

/// A raised cover: the covering card and the player it protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoverSlot {
    pub card: Entity,
    pub player: Entity,
}

/// Active covers of a match, one slot per seat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoverPosition {
    pub one: Option<CoverSlot>,
    pub two: Option<CoverSlot>,
}

/// Card archetypes. `Base` is reserved for the home card and is always last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitType {
    VaanStrife,
    Felguard,
    Sakura,
    Freya,
    Lyra,
    Madmartigan,
    Base,
}

impl UnitType {
    /// Every unit a player may summon.
    pub const PLACEABLE: [UnitType; 6] = [
        UnitType::VaanStrife,
        UnitType::Felguard,
        UnitType::Sakura,
        UnitType::Freya,
        UnitType::Lyra,
        UnitType::Madmartigan,
    ];
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The special action a card can perform instead of a plain attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AbilityType {
    Meteor,
    DrainSword,
    PiercingShot,
    WhirlwindAxe,
    Sidestep,
    Cover,
}

impl fmt::Display for AbilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Where a card stands. Occupancy is answered by indexing this table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub placed: bool,
    pub match_id: Entity,
    pub x: u32,
    pub y: u32,
}

impl Position {
    #[must_use]
    pub fn placed(match_id: Entity, x: u32, y: u32) -> Self {
        Self {
            placed: true,
            match_id,
            x,
            y,
        }
    }
}

/// The cell a Sidestep card stood on when its owner's turn began. The card
/// returns there after striking; `active` is cleared once it has.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SidestepInitialPosition {
    pub active: bool,
    pub x: u32,
    pub y: u32,
}

impl SidestepInitialPosition {
    #[must_use]
    pub fn saved(x: u32, y: u32) -> Self {
        Self { active: true, x, y }
    }
}

macro_rules! row_values {
    ($($name:ident),* $(,)?) => {
        $(
            impl Component for $name {
                fn type_name() -> &'static str {
                    stringify!($name)
                }
            }

            impl From<$name> for RowValue {
                fn from(value: $name) -> Self {
                    RowValue::$name(value)
                }
            }
        )*

        /// A typed row of any game table, as carried by a [`Delta`](crate::Delta).
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub enum RowValue {
            $($name($name),)*
        }

        impl RowValue {
            /// Name of the table the row belongs to.
            #[must_use]
            pub fn table_name(&self) -> &'static str {
                match self {
                    $(Self::$name(_) => stringify!($name),)*
                }
            }
        }
    };
}

row_values! {
    UserName,
    MapConfig,
    MatchPhase,
    PlayerOne,
    PlayerTwo,
    CurrentTurn,
    CurrentPlayer,
    CurrentMana,
    PlacedCards,
    CoverPosition,
    OwnedBy,
    UsedIn,
    IsBase,
    UnitType,
    AbilityType,
    AttackDamage,
    MaxHp,
    CurrentHp,
    MovementSpeed,
    ActionReady,
    Position,
    SidestepInitialPosition,
}

#[cfg(test)]
mod tests {
    use arena_store::ComponentTypeId;

    use super::*;

    #[test]
    fn test_table_names_follow_type_names() {
        assert_eq!(Position::type_name(), "Position");
        assert_eq!(
            CurrentHp::component_type_id(),
            ComponentTypeId::from_name("CurrentHp")
        );
        assert_eq!(RowValue::from(UsedIn(Entity(3))).table_name(), "UsedIn");
    }

    #[test]
    fn test_base_is_last_unit() {
        assert!(UnitType::PLACEABLE.iter().all(|unit| *unit < UnitType::Base));
    }

    #[test]
    fn test_per_player_cap_rounds_down() {
        let map = MapConfig {
            width: 5,
            height: 5,
            max_placed_cards: 5,
        };
        assert_eq!(map.per_player_cap(), 2);
        assert!(map.contains(4, 4));
        assert!(!map.contains(5, 0));
    }

    #[test]
    fn test_row_value_is_keyed_by_table() {
        let row = RowValue::from(CurrentMana(6));
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["CurrentMana"], 6);

        let bytes = rmp_serde::to_vec(&RowValue::from(Position::placed(Entity(2), 1, 3))).unwrap();
        let restored: RowValue = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(restored.table_name(), "Position");
    }
}
