//! Mapping from caller credentials to registered users.

use arena_store::Entity;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Resolves an opaque caller credential to a User entity.
pub trait IdentityProvider: Send + Sync {
    /// The user bound to `credential`, if any.
    fn resolve(&self, credential: &str) -> Option<Entity>;

    /// Binds `credential` to `user`. Returns `false` if it was already bound.
    fn bind(&self, credential: &str, user: Entity) -> bool;
}

/// In-memory credential table.
#[derive(Debug, Default)]
pub struct SessionDirectory {
    sessions: DashMap<String, Entity>,
}

impl SessionDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl IdentityProvider for SessionDirectory {
    fn resolve(&self, credential: &str) -> Option<Entity> {
        self.sessions.get(credential).map(|user| *user)
    }

    fn bind(&self, credential: &str, user: Entity) -> bool {
        match self.sessions.entry(credential.to_owned()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(user);
                true
            }
        }
    }
}
