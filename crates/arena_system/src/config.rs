//! Service configuration.

use arena_net::Subjects;
use arena_net::subjects::{DEFAULT_PREFIX, QUEUE_GROUP};

/// Configuration for an action service process.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Subject prefix (e.g. `"arena"`).
    pub prefix: String,
    /// Queue group shared by all instances of the service.
    pub queue_group: String,
    /// Optional NATS URL override (defaults to `NATS_URL` env or localhost).
    pub nats_url: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl ServiceConfig {
    /// Create a config serving the subjects under `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            queue_group: QUEUE_GROUP.to_string(),
            nats_url: None,
        }
    }

    /// Override the NATS URL for this service.
    #[must_use]
    pub fn with_nats_url(mut self, url: impl Into<String>) -> Self {
        self.nats_url = Some(url.into());
        self
    }

    /// Override the queue group.
    #[must_use]
    pub fn with_queue_group(mut self, group: impl Into<String>) -> Self {
        self.queue_group = group.into();
        self
    }

    #[must_use]
    pub fn subjects(&self) -> Subjects {
        Subjects::new(self.prefix.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.prefix, "arena");
        assert_eq!(config.queue_group, QUEUE_GROUP);
        assert!(config.nats_url.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ServiceConfig::new("dev")
            .with_nats_url("nats://10.0.0.5:4222")
            .with_queue_group("q.dev");
        assert_eq!(config.subjects().action(), "dev.action");
        assert_eq!(config.nats_url.as_deref(), Some("nats://10.0.0.5:4222"));
        assert_eq!(config.queue_group, "q.dev");
    }
}
