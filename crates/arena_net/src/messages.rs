//! Message types exchanged between clients and the action service.
//!
//! All message types derive `Serialize` and `Deserialize` for MessagePack
//! transport. One [`Action`] variant exists per named system.

use arena_engine::components::{MapConfig, UnitType};
use arena_engine::{Ability, BoardView, ErrorKind, MatchError, OpenMatch, Outcome};
use arena_store::Entity;
use serde::{Deserialize, Serialize};

// ── Actions ─────────────────────────────────────────────────────────────────

/// One request to change the game, as submitted by a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Register {
        username: String,
    },
    CreateMatch {
        map: MapConfig,
    },
    JoinMatch {
        match_id: Entity,
    },
    PlaceCard {
        match_id: Entity,
        unit: UnitType,
        x: u32,
        y: u32,
    },
    MoveCard {
        match_id: Entity,
        card: Entity,
        x: u32,
        y: u32,
    },
    Attack {
        match_id: Entity,
        attacker: Entity,
        target: Entity,
    },
    EndTurn {
        match_id: Entity,
    },
    Surrender {
        match_id: Entity,
    },
    Meteor {
        match_id: Entity,
        card: Entity,
        x: u32,
        y: u32,
    },
    DrainSword {
        match_id: Entity,
        card: Entity,
        target: Entity,
    },
    PiercingShot {
        match_id: Entity,
        card: Entity,
        x: u32,
        y: u32,
    },
    WhirlwindAxe {
        match_id: Entity,
        card: Entity,
    },
    Sidestep {
        match_id: Entity,
        card: Entity,
        x: u32,
        y: u32,
    },
    Cover {
        match_id: Entity,
        card: Entity,
    },
}

impl Action {
    /// The system this action is routed to, e.g. `"placecard"`.
    #[must_use]
    pub fn system_name(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::CreateMatch { .. } => "creatematch",
            Self::JoinMatch { .. } => "joinmatch",
            Self::PlaceCard { .. } => "placecard",
            Self::MoveCard { .. } => "movecard",
            Self::Attack { .. } => "attack",
            Self::EndTurn { .. } => "endturn",
            Self::Surrender { .. } => "surrender",
            Self::Meteor { .. } => "meteor",
            Self::DrainSword { .. } => "drainsword",
            Self::PiercingShot { .. } => "piercingshot",
            Self::WhirlwindAxe { .. } => "whirlwindaxe",
            Self::Sidestep { .. } => "sidestep",
            Self::Cover { .. } => "cover",
        }
    }

    /// The match the action targets, if it targets an existing one.
    #[must_use]
    pub fn match_id(&self) -> Option<Entity> {
        match self {
            Self::Register { .. } | Self::CreateMatch { .. } => None,
            Self::JoinMatch { match_id }
            | Self::PlaceCard { match_id, .. }
            | Self::MoveCard { match_id, .. }
            | Self::Attack { match_id, .. }
            | Self::EndTurn { match_id }
            | Self::Surrender { match_id }
            | Self::Meteor { match_id, .. }
            | Self::DrainSword { match_id, .. }
            | Self::PiercingShot { match_id, .. }
            | Self::WhirlwindAxe { match_id, .. }
            | Self::Sidestep { match_id, .. }
            | Self::Cover { match_id, .. } => Some(*match_id),
        }
    }

    /// The acting card and ability for the six ability systems.
    #[must_use]
    pub fn ability(&self) -> Option<(Entity, Ability)> {
        match *self {
            Self::Meteor { card, x, y, .. } => Some((card, Ability::Meteor { x, y })),
            Self::DrainSword { card, target, .. } => Some((card, Ability::DrainSword { target })),
            Self::PiercingShot { card, x, y, .. } => Some((card, Ability::PiercingShot { x, y })),
            Self::WhirlwindAxe { card, .. } => Some((card, Ability::WhirlwindAxe)),
            Self::Sidestep { card, x, y, .. } => Some((card, Ability::Sidestep { x, y })),
            Self::Cover { card, .. } => Some((card, Ability::Cover)),
            _ => None,
        }
    }
}

/// An [`Action`] together with the caller's credential.
/// Sent as a request on [`Subjects::action`](crate::Subjects::action).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    /// Opaque credential resolved by the identity provider.
    pub credential: String,
    pub action: Action,
}

/// A typed refusal, as shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&MatchError> for ActionFailure {
    fn from(err: &MatchError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Reply to an [`ActionEnvelope`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionReply {
    Accepted(Outcome),
    Rejected(ActionFailure),
}

impl From<Result<Outcome, MatchError>> for ActionReply {
    fn from(result: Result<Outcome, MatchError>) -> Self {
        match result {
            Ok(outcome) => Self::Accepted(outcome),
            Err(err) => Self::Rejected(ActionFailure::from(&err)),
        }
    }
}

// ── Queries ─────────────────────────────────────────────────────────────────

/// Asks for the board of one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardRequest {
    pub match_id: Entity,
}

/// Reply to a [`BoardRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoardReply {
    Board(Box<BoardView>),
    Rejected(ActionFailure),
}

/// Reply to a request on the open-match subject. The request body is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchList {
    pub matches: Vec<OpenMatch>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_names_are_unique() {
        let actions = [
            Action::Register {
                username: "a".into(),
            },
            Action::CreateMatch {
                map: MapConfig {
                    width: 5,
                    height: 5,
                    max_placed_cards: 4,
                },
            },
            Action::JoinMatch { match_id: Entity(1) },
            Action::EndTurn { match_id: Entity(1) },
            Action::Surrender { match_id: Entity(1) },
            Action::WhirlwindAxe {
                match_id: Entity(1),
                card: Entity(2),
            },
            Action::Cover {
                match_id: Entity(1),
                card: Entity(2),
            },
        ];
        let mut names: Vec<_> = actions.iter().map(Action::system_name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), actions.len());
    }

    #[test]
    fn test_match_id_routing() {
        assert_eq!(
            Action::Register {
                username: "a".into()
            }
            .match_id(),
            None
        );
        let attack = Action::Attack {
            match_id: Entity(9),
            attacker: Entity(10),
            target: Entity(11),
        };
        assert_eq!(attack.match_id(), Some(Entity(9)));
        assert_eq!(attack.ability(), None);
    }

    #[test]
    fn test_ability_actions_map_to_abilities() {
        let action = Action::Sidestep {
            match_id: Entity(1),
            card: Entity(4),
            x: 2,
            y: 3,
        };
        assert_eq!(
            action.ability(),
            Some((Entity(4), Ability::Sidestep { x: 2, y: 3 }))
        );
    }

    #[test]
    fn test_rejected_reply_carries_kind() {
        let reply = ActionReply::from(Err(MatchError::Occupied { x: 1, y: 2 }));
        match reply {
            ActionReply::Rejected(failure) => {
                assert_eq!(failure.kind, ErrorKind::Occupied);
                assert_eq!(failure.message, "cell (1, 2) is occupied");
            }
            ActionReply::Accepted(_) => panic!("expected rejection"),
        }
    }

    #[test]
    fn test_reply_roundtrip() {
        let reply = ActionReply::Accepted(Outcome {
            match_id: Some(Entity(3)),
            ..Outcome::default()
        });
        let bytes = crate::encode(&reply).unwrap();
        let restored: ActionReply = crate::decode(&bytes).unwrap();
        assert_eq!(restored, reply);
    }
}
