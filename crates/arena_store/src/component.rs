//! Core [`Component`] trait and table identity.
//!
//! Every table in the arena maps an [`Entity`](crate::Entity) to one value
//! type, and that value type implements [`Component`]. The trait asks for
//! equality and hashing so any table can carry a
//! [`ValueIndex`](crate::ValueIndex), and for serde so rows can be shipped to
//! external readers.
//!
//! ## Table Identity
//!
//! [`ComponentTypeId`] is derived from the table's **string name** using the
//! FNV-1a 64-bit hash. It is deterministic and language-neutral, so a reader
//! written in any language can map the id in a delta back to a table name.

use std::fmt::Debug;
use std::hash::Hash;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A unique identifier for a table, derived from its name with FNV-1a 64.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, serde::Deserialize)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the id from a table name.
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325
    /// for each byte in name.as_bytes():
    ///     hash = hash XOR byte
    ///     hash = hash * 0x00000100000001b3
    /// ```
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Compute the id for a component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }
}

/// The contract for a table value.
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use arena_store::Component;
///
/// #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// struct CurrentHp(u32);
///
/// impl Component for CurrentHp {
///     fn type_name() -> &'static str { "CurrentHp" }
/// }
/// ```
pub trait Component:
    Debug + Clone + Eq + Hash + Send + Sync + 'static + Serialize + DeserializeOwned
{
    /// The table name, e.g. `"Position"`.
    fn type_name() -> &'static str;

    /// Returns the [`ComponentTypeId`] of this table.
    fn component_type_id() -> ComponentTypeId {
        ComponentTypeId::from_name(Self::type_name())
    }
}
