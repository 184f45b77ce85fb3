//! # arena_system
//!
//! Action dispatch and the NATS service harness for the arena.
//!
//! An [`ActionService`] instance:
//!
//! 1. Connects to NATS.
//! 2. Joins a queue group on the action and query subjects.
//! 3. Resolves each caller's credential and runs the action through a
//!    [`SystemDispatcher`], one transition at a time per match.
//! 4. Replies to the caller and broadcasts accepted outcomes.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use arena_engine::{MatchEngine, RulesConfig};
//! use arena_system::{ActionService, ServiceConfig, SessionDirectory, SystemDispatcher};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let dispatcher = SystemDispatcher::new(
//!         MatchEngine::new(RulesConfig::default()),
//!         SessionDirectory::new(),
//!     );
//!     ActionService::new(ServiceConfig::new("arena"), dispatcher)
//!         .run()
//!         .await
//! }
//! ```

pub mod config;
pub mod dispatcher;
pub mod identity;
pub mod runner;

pub use config::ServiceConfig;
pub use dispatcher::SystemDispatcher;
pub use identity::{IdentityProvider, SessionDirectory};
pub use runner::ActionService;
