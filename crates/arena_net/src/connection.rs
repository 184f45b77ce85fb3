//! Client side of the arena's NATS traffic.
//!
//! [`NatsConnection`] wraps an `async-nats` client and speaks MessagePack
//! when it publishes or answers a request.

use serde::Serialize;
use tracing::info;

use crate::error::NetError;

/// Server used when neither an explicit URL nor `NATS_URL` is given.
pub const DEFAULT_NATS_URL: &str = "nats://localhost:4222";

/// Environment override for the server URL.
pub const NATS_URL_ENV: &str = "NATS_URL";

/// A MessagePack-speaking handle on one NATS client.
#[derive(Debug, Clone)]
pub struct NatsConnection {
    client: async_nats::Client,
}

impl NatsConnection {
    /// Opens a connection to `url`, or to `NATS_URL`, or to
    /// [`DEFAULT_NATS_URL`], whichever is found first.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Connect`] if the server cannot be reached.
    pub async fn open(url: Option<&str>) -> Result<Self, NetError> {
        let url = match url {
            Some(url) => url.to_owned(),
            None => std::env::var(NATS_URL_ENV).unwrap_or_else(|_| DEFAULT_NATS_URL.to_owned()),
        };
        info!(%url, "opening NATS connection");
        let client = async_nats::connect(url.as_str()).await?;
        info!(%url, "NATS connection open");
        Ok(Self { client })
    }

    /// Broadcasts `message` on `subject`.
    ///
    /// # Errors
    ///
    /// Encode or publish failures.
    pub async fn publish<T: Serialize>(&self, subject: String, message: &T) -> Result<(), NetError> {
        let payload = crate::codec::encode(message)?;
        self.client.publish(subject, payload.into()).await?;
        Ok(())
    }

    /// Answer a request on its reply subject.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::NoReplySubject`] when the message was published
    /// without one, or any encode/publish error.
    pub async fn respond<T: Serialize>(
        &self,
        request: &async_nats::Message,
        message: &T,
    ) -> Result<(), NetError> {
        let reply = request
            .reply
            .clone()
            .ok_or_else(|| NetError::NoReplySubject(request.subject.to_string()))?;
        let payload = crate::codec::encode(message)?;
        self.client.publish(reply, payload.into()).await?;
        Ok(())
    }

    /// Joins `group` on `subject`; each message reaches one member.
    ///
    /// # Errors
    ///
    /// [`NetError::Subscribe`] if the server refuses it.
    pub async fn queue_subscribe(
        &self,
        subject: String,
        group: &str,
    ) -> Result<async_nats::Subscriber, NetError> {
        Ok(self
            .client
            .queue_subscribe(subject, group.to_string())
            .await?)
    }
}
