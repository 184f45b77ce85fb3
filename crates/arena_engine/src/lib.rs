//! # arena_engine
//!
//! A two-player, turn-based card battle played on a grid, written entirely
//! as reads and writes of [`arena_store`] tables.
//!
//! This crate provides:
//!
//! - [`components`]: the game tables (positions, hit points, mana, ...).
//! - [`rules`]: [`RulesConfig`]: mana curve, costs, unit catalog.
//! - [`grid`]: cell distances and ability shapes.
//! - [`world`]: the table set, snapshots, and [`Outcome`] deltas.
//! - [`engine`]: [`MatchEngine`], the match state machine.
//! - [`abilities`]: the six card abilities.
//! - [`board`]: read models for clients.

pub mod abilities;
pub mod board;
pub mod components;
pub mod engine;
pub mod error;
pub mod events;
pub mod grid;
pub mod rules;
pub mod world;

#[cfg(test)]
mod tests;

pub use abilities::Ability;
pub use board::{BoardView, OpenMatch, PlayerView};
pub use engine::{MAX_USERNAME_LEN, MatchEngine};
pub use error::{ErrorKind, MatchError, MatchResult};
pub use events::{FinishReason, GameEvent};
pub use rules::{RulesConfig, RulesError};
pub use world::{CardView, Change, Delta, MatchState, Outcome, Seat, World};
