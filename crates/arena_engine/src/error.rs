//! Rejection reasons for match transitions.

use arena_store::{Entity, EntityKind};
use serde::{Deserialize, Serialize};

/// Why a transition was refused. A refused transition never writes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// The referenced user, match or card does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: Entity },

    /// The actor does not control the entity, or it is not their turn.
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    /// The match or card is not in a state that allows the action.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// The target lies off the board or beyond the allowed range.
    #[error("out of bounds: {0}")]
    OutOfBounds(&'static str),

    /// Not enough mana, or the placement cap is reached.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(&'static str),

    /// The target cell already holds a card.
    #[error("cell ({x}, {y}) is occupied")]
    Occupied { x: u32, y: u32 },
}

/// Wire-level classification of a [`MatchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    InvalidState,
    OutOfBounds,
    ResourceExhausted,
    Occupied,
}

impl MatchError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::OutOfBounds(_) => ErrorKind::OutOfBounds,
            Self::ResourceExhausted(_) => ErrorKind::ResourceExhausted,
            Self::Occupied { .. } => ErrorKind::Occupied,
        }
    }

    pub(crate) fn missing(kind: EntityKind, id: Entity) -> Self {
        Self::NotFound { kind, id }
    }
}

pub type MatchResult<T> = Result<T, MatchError>;
