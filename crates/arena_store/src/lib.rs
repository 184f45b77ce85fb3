//! # arena_store
//!
//! The storage half of the arena: entity identities, one typed table per
//! component, and reverse lookups from a value to the entities holding it.
//!
//! This crate provides:
//!
//! - [`Entity`]: lightweight `u64` entity identifiers.
//! - [`EntityRegistry`]: mints ids and tracks which entities are alive.
//! - [`Component`]: the contract every table value must satisfy.
//! - [`ValueIndex`]: value → set-of-keys reverse index.
//! - [`ComponentStore`]: a typed key → value table with an optional index.

pub mod component;
pub mod entity;
pub mod index;
pub mod store;

pub use component::{Component, ComponentTypeId};
pub use entity::{Entity, EntityKind, EntityRegistry};
pub use index::ValueIndex;
pub use store::ComponentStore;
