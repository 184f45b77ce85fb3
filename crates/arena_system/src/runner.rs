//! Action service runner, the NATS front of a [`SystemDispatcher`].
//!
//! The runner handles connection, subscriptions, and the per-request
//! decode/dispatch/reply cycle. Each request runs on its own task, and
//! transitions run on the blocking pool so that one busy match does not
//! hold up the others.

use std::sync::Arc;

use anyhow::Result;
use futures::StreamExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use arena_net::messages::{BoardReply, BoardRequest, MatchList};
use arena_net::{ActionEnvelope, ActionFailure, ActionReply, NatsConnection, Subjects};

use crate::config::ServiceConfig;
use crate::dispatcher::SystemDispatcher;

/// Serves actions and read queries over NATS request/reply.
#[derive(Debug)]
pub struct ActionService {
    /// Service configuration.
    config: ServiceConfig,
    dispatcher: Arc<SystemDispatcher>,
    /// Unique instance identifier for this process.
    instance_id: String,
}

impl ActionService {
    #[must_use]
    pub fn new(config: ServiceConfig, dispatcher: SystemDispatcher) -> Self {
        Self {
            config,
            dispatcher: Arc::new(dispatcher),
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Returns the unique instance ID for this service.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    #[must_use]
    pub fn subjects(&self) -> Subjects {
        self.config.subjects()
    }

    #[must_use]
    pub fn dispatcher(&self) -> &SystemDispatcher {
        &self.dispatcher
    }

    /// Run the service until every subscription closes.
    ///
    /// 1. Connect to NATS.
    /// 2. Join the queue group on the action and query subjects.
    /// 3. Loop: receive request → dispatch → reply, and broadcast accepted
    ///    outcomes on the match's event subject.
    ///
    /// # Errors
    ///
    /// Returns an error if connecting or subscribing fails. Failures while
    /// handling a single request are logged and do not stop the service.
    pub async fn run(self) -> Result<()> {
        let subjects = self.config.subjects();

        info!(
            instance_id = self.instance_id,
            prefix = subjects.prefix(),
            "action service starting"
        );

        let conn = NatsConnection::open(self.config.nats_url.as_deref()).await?;
        let group = self.config.queue_group.as_str();
        let mut actions = conn.queue_subscribe(subjects.action(), group).await?;
        let mut boards = conn.queue_subscribe(subjects.board(), group).await?;
        let mut listings = conn.queue_subscribe(subjects.open_matches(), group).await?;
        info!(subject = subjects.action(), group, "subscribed to actions");

        let handler = Arc::new(Handler {
            conn,
            dispatcher: self.dispatcher,
            subjects,
        });

        loop {
            tokio::select! {
                Some(msg) = actions.next() => {
                    let handler = Arc::clone(&handler);
                    tokio::spawn(async move {
                        if let Err(err) = handler.action(msg).await {
                            warn!(error = %err, "action request failed");
                        }
                    });
                }
                Some(msg) = boards.next() => {
                    if let Err(err) = handler.board(msg).await {
                        warn!(error = %err, "board query failed");
                    }
                }
                Some(msg) = listings.next() => {
                    if let Err(err) = handler.open_matches(msg).await {
                        warn!(error = %err, "match listing failed");
                    }
                }
                else => break,
            }
        }

        info!(instance_id = self.instance_id, "action service stopped");
        Ok(())
    }
}

#[derive(Debug)]
struct Handler {
    conn: NatsConnection,
    dispatcher: Arc<SystemDispatcher>,
    subjects: Subjects,
}

impl Handler {
    async fn action(&self, msg: async_nats::Message) -> Result<()> {
        let envelope: ActionEnvelope = arena_net::decode(&msg.payload)?;
        let system = envelope.action.system_name();

        let dispatcher = Arc::clone(&self.dispatcher);
        let result = tokio::task::spawn_blocking(move || {
            dispatcher.dispatch(&envelope.credential, envelope.action)
        })
        .await?;

        match &result {
            Ok(outcome) => {
                debug!(system, events = outcome.events.len(), "action applied");
                if let Some(match_id) = outcome.match_id {
                    self.conn
                        .publish(self.subjects.events(match_id.0), outcome)
                        .await?;
                }
            }
            Err(err) => warn!(system, kind = ?err.kind(), %err, "action rejected"),
        }

        self.conn.respond(&msg, &ActionReply::from(result)).await?;
        Ok(())
    }

    async fn board(&self, msg: async_nats::Message) -> Result<()> {
        let request: BoardRequest = arena_net::decode(&msg.payload)?;
        let reply = match self.dispatcher.board(request.match_id) {
            Ok(view) => BoardReply::Board(Box::new(view)),
            Err(err) => BoardReply::Rejected(ActionFailure::from(&err)),
        };
        self.conn.respond(&msg, &reply).await?;
        Ok(())
    }

    async fn open_matches(&self, msg: async_nats::Message) -> Result<()> {
        let reply = MatchList {
            matches: self.dispatcher.open_matches(),
        };
        self.conn.respond(&msg, &reply).await?;
        Ok(())
    }
}
