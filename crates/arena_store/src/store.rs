//! Typed per-table storage.
//!
//! A [`ComponentStore`] holds one table: entity → value for a single
//! [`Component`] type, e.g. `Position` or `CurrentHp`. Stores that need
//! reverse lookups carry a [`ValueIndex`] which is updated inside the same
//! row lock as the primary write.

use std::collections::BTreeSet;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::component::{Component, ComponentTypeId};
use crate::entity::Entity;
use crate::index::ValueIndex;

/// One table of the world.
#[derive(Debug)]
pub struct ComponentStore<C: Component> {
    rows: DashMap<Entity, C>,
    index: Option<ValueIndex<Entity, C>>,
}

impl<C: Component> ComponentStore<C> {
    /// Creates an empty table without a reverse index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            index: None,
        }
    }

    /// Creates an empty table with an attached [`ValueIndex`].
    #[must_use]
    pub fn indexed() -> Self {
        Self {
            rows: DashMap::new(),
            index: Some(ValueIndex::new()),
        }
    }

    /// Returns `true` if this table carries a reverse index.
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// The table name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        C::type_name()
    }

    /// The table id.
    #[must_use]
    pub fn type_id(&self) -> ComponentTypeId {
        C::component_type_id()
    }

    /// Returns a copy of the row for `key`.
    #[must_use]
    pub fn get(&self, key: Entity) -> Option<C> {
        self.rows.get(&key).map(|row| row.value().clone())
    }

    /// Returns `true` if `key` has a row.
    #[must_use]
    pub fn has(&self, key: Entity) -> bool {
        self.rows.contains_key(&key)
    }

    /// Writes the row for `key`, overwriting any previous value.
    ///
    /// Returns the previous value, which is how callers learn what changed.
    pub fn set(&self, key: Entity, value: C) -> Option<C> {
        match self.rows.entry(key) {
            Entry::Occupied(mut row) => {
                if let Some(index) = &self.index {
                    index.set(key, value.clone());
                }
                Some(row.insert(value))
            }
            Entry::Vacant(row) => {
                if let Some(index) = &self.index {
                    index.set(key, value.clone());
                }
                row.insert(value);
                None
            }
        }
    }

    /// Deletes the row for `key` together with its index entry.
    pub fn remove(&self, key: Entity) -> Option<C> {
        match self.rows.entry(key) {
            Entry::Occupied(row) => {
                if let Some(index) = &self.index {
                    index.remove(key);
                }
                Some(row.remove())
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Returns every key whose row equals `value`.
    ///
    /// Indexed tables answer from their [`ValueIndex`]; the rest scan.
    #[must_use]
    pub fn keys_with_value(&self, value: &C) -> BTreeSet<Entity> {
        match &self.index {
            Some(index) => index.keys_with_value(value),
            None => self
                .rows
                .iter()
                .filter(|row| row.value() == value)
                .map(|row| *row.key())
                .collect(),
        }
    }

    /// Returns all keys with a row, in ascending order.
    #[must_use]
    pub fn keys(&self) -> BTreeSet<Entity> {
        self.rows.iter().map(|row| *row.key()).collect()
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<C: Component> Default for ComponentStore<C> {
    fn default() -> Self {
        Self::new()
    }
}
