//! Reverse index from a value to the keys currently holding it.
//!
//! A [`ValueIndex`] shadows a key → value table and answers "which keys hold
//! value V" without scanning. It is what turns cell occupancy ("who stands on
//! (match, 3, 4)?") and match membership ("which cards are used in match M?")
//! into O(1) lookups.
//!
//! Both maps are [`DashMap`]s so that matches running on different threads
//! can update the same index. Every mutation takes the key's slot in
//! `assigned` first and the affected buckets second; keeping that order
//! everywhere is what rules out lock cycles.

use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Maintains the inverse of a key → value mapping.
///
/// Invariant: every key present in `assigned` appears in exactly one bucket,
/// the bucket of its current value, and no bucket is ever left empty.
#[derive(Debug)]
pub struct ValueIndex<K, V>
where
    K: Eq + Hash,
    V: Eq + Hash,
{
    /// The value each indexed key currently holds.
    assigned: DashMap<K, V>,
    /// Value → keys holding it.
    buckets: DashMap<V, HashSet<K>>,
}

impl<K, V> ValueIndex<K, V>
where
    K: Copy + Eq + Hash + Ord,
    V: Clone + Eq + Hash,
{
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            assigned: DashMap::new(),
            buckets: DashMap::new(),
        }
    }

    /// Records that `key` now holds `value`, moving it out of the bucket of
    /// its previous value. Setting the value a key already holds is a no-op.
    pub fn set(&self, key: K, value: V) {
        match self.assigned.entry(key) {
            Entry::Occupied(mut slot) => {
                if *slot.get() == value {
                    return;
                }
                let old = slot.insert(value.clone());
                self.detach(key, &old);
                self.attach(key, value);
            }
            Entry::Vacant(slot) => {
                self.attach(key, value.clone());
                slot.insert(value);
            }
        }
    }

    /// Drops `key` from whatever bucket it occupies.
    ///
    /// Returns the value the key held. Unknown keys are simply unmapped.
    pub fn remove(&self, key: K) -> Option<V> {
        match self.assigned.entry(key) {
            Entry::Occupied(slot) => {
                self.detach(key, slot.get());
                Some(slot.remove())
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Returns every key currently mapped to `value`; empty if none.
    #[must_use]
    pub fn keys_with_value(&self, value: &V) -> BTreeSet<K> {
        self.buckets
            .get(value)
            .map(|bucket| bucket.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the number of indexed keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    /// Returns `true` if no key is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    #[cfg(test)]
    fn value_of(&self, key: K) -> Option<V> {
        self.assigned.get(&key).map(|value| value.clone())
    }

    #[cfg(test)]
    fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn attach(&self, key: K, value: V) {
        self.buckets.entry(value).or_default().insert(key);
    }

    fn detach(&self, key: K, value: &V) {
        if let Some(mut bucket) = self.buckets.get_mut(value) {
            bucket.remove(&key);
        }
        self.buckets.remove_if(value, |_, keys| keys.is_empty());
    }
}

impl<K, V> Default for ValueIndex<K, V>
where
    K: Copy + Eq + Hash + Ord,
    V: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
