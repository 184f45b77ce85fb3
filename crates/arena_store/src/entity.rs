//! Entity type and the registry that mints entity ids.
//!
//! An [`Entity`] is a lightweight `u64` identifier with no inherent data.
//! Users, matches and cards are all entities; what an entity *is* comes from
//! the tables that hold rows for it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// A unique entity identifier.
///
/// Ids are allocated by the [`EntityRegistry`] and are never reused, so a
/// stale id can be told apart from a live one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Entity(pub u64);

impl Entity {
    /// The null / invalid entity sentinel.
    pub const INVALID: Entity = Entity(0);

    /// Create an entity from a raw `u64` identifier.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) entity.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// What kind of thing an entity stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    User,
    Match,
    Card,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::Match => "match",
            Self::Card => "card",
        };
        f.write_str(name)
    }
}

/// Allocates entity ids and records which of them are alive.
///
/// The registry is shared by every match, so both the id counter and the
/// live set are safe to mutate from several threads at once. Destroyed ids
/// are forgotten but never handed out again.
#[derive(Debug)]
pub struct EntityRegistry {
    next_id: AtomicU64,
    live: DashMap<Entity, EntityKind>,
}

impl EntityRegistry {
    /// Creates an empty registry. Ids start at 1 (0 is [`Entity::INVALID`]).
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            live: DashMap::new(),
        }
    }

    /// Mints a fresh entity of the given kind and marks it alive.
    pub fn create(&self, kind: EntityKind) -> Entity {
        let entity = Entity(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.live.insert(entity, kind);
        trace!(%entity, %kind, "entity created");
        entity
    }

    /// Returns `true` if the entity was created and not yet destroyed.
    #[must_use]
    pub fn exists(&self, entity: Entity) -> bool {
        self.live.contains_key(&entity)
    }

    /// Returns the kind of a live entity.
    #[must_use]
    pub fn kind(&self, entity: Entity) -> Option<EntityKind> {
        self.live.get(&entity).map(|kind| *kind)
    }

    /// Returns `true` if the entity is alive and of the given kind.
    #[must_use]
    pub fn is(&self, entity: Entity, kind: EntityKind) -> bool {
        self.kind(entity) == Some(kind)
    }

    /// Marks an entity as no longer existing.
    ///
    /// Returns `true` if the entity was alive.
    pub fn destroy(&self, entity: Entity) -> bool {
        let removed = self.live.remove(&entity).is_some();
        if removed {
            trace!(%entity, "entity destroyed");
        }
        removed
    }

    /// Returns the number of ids handed out so far, destroyed ones included.
    #[must_use]
    pub fn allocated(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed) - 1
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn live(&self) -> usize {
        self.live.len()
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
