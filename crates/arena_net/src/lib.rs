//! # arena_net
//!
//! NATS transport layer for the arena action service.
//!
//! This crate provides:
//!
//! - [`subjects`]: subject names under a configurable prefix.
//! - [`messages`]: action requests, replies and query messages.
//! - [`codec`]: MessagePack serialisation/deserialisation helpers.
//! - [`connection`]: NATS connection wrapper speaking MessagePack.
//! - [`error`]: Network-layer error types.

pub mod codec;
pub mod connection;
pub mod error;
pub mod messages;
pub mod subjects;

pub use codec::{decode, encode};
pub use connection::NatsConnection;
pub use error::NetError;
pub use messages::{Action, ActionEnvelope, ActionFailure, ActionReply};
pub use subjects::Subjects;
