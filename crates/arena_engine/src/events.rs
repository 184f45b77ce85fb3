//! What a transition did, in game terms.
//!
//! Events accompany the raw table [`Delta`](crate::Delta)s of an outcome.
//! Clients use them to animate; persistence only needs the deltas.

use arena_store::Entity;
use serde::{Deserialize, Serialize};

use crate::components::{AbilityType, UnitType};

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FinishReason {
    BaseDestroyed,
    Surrender,
}

/// A single game-level fact produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameEvent {
    UserRegistered {
        user: Entity,
        username: String,
    },
    MatchCreated {
        match_id: Entity,
        creator: Entity,
    },
    PlayerJoined {
        match_id: Entity,
        player: Entity,
    },
    CardPlaced {
        card: Entity,
        owner: Entity,
        unit: UnitType,
        x: u32,
        y: u32,
    },
    CardMoved {
        card: Entity,
        from: (u32, u32),
        to: (u32, u32),
    },
    AbilityUsed {
        card: Entity,
        ability: AbilityType,
    },
    CardDamaged {
        card: Entity,
        previous: u32,
        current: u32,
    },
    CardHealed {
        card: Entity,
        previous: u32,
        current: u32,
    },
    CardDestroyed {
        card: Entity,
    },
    TurnEnded {
        match_id: Entity,
        turn: u32,
        next_player: Entity,
        mana: u32,
    },
    CoverRaised {
        card: Entity,
        player: Entity,
    },
    CoverExpired {
        card: Entity,
    },
    MatchFinished {
        match_id: Entity,
        winner: Entity,
        reason: FinishReason,
    },
}
