//! NATS subject hierarchy.
//!
//! All subjects live under one prefix (default `arena`) so that several
//! deployments can share a NATS cluster:
//!
//! | Subject                        | Pattern        | Payload                  |
//! |--------------------------------|----------------|--------------------------|
//! | `<prefix>.action`              | request/reply  | `ActionEnvelope` → `ActionReply` |
//! | `<prefix>.query.board`         | request/reply  | `BoardRequest` → `BoardReply`    |
//! | `<prefix>.query.matches`       | request/reply  | empty → `MatchList`              |
//! | `<prefix>.events.<match_id>`   | broadcast      | `Outcome`                        |

/// Default subject prefix.
pub const DEFAULT_PREFIX: &str = "arena";

/// Queue group shared by all action service instances.
pub const QUEUE_GROUP: &str = "q.arena";

/// Subject builder bound to one prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subjects {
    prefix: String,
}

impl Default for Subjects {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl Subjects {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `<prefix>.action`
    #[must_use]
    pub fn action(&self) -> String {
        format!("{}.action", self.prefix)
    }

    /// `<prefix>.query.board`
    #[must_use]
    pub fn board(&self) -> String {
        format!("{}.query.board", self.prefix)
    }

    /// `<prefix>.query.matches`
    #[must_use]
    pub fn open_matches(&self) -> String {
        format!("{}.query.matches", self.prefix)
    }

    /// `<prefix>.events.<match_id>`
    #[must_use]
    pub fn events(&self, match_id: u64) -> String {
        format!("{}.events.{match_id}", self.prefix)
    }

    /// `<prefix>.events.*`, for watching every match.
    #[must_use]
    pub fn all_events(&self) -> String {
        format!("{}.events.*", self.prefix)
    }
}
