//! Client capability consumed by the benchmark runners
//!
//! Runners never touch the wire; they drive sessions through this trait.
//! The production implementation lives in [`mqtt`]; tests script the
//! capability through the mock in [`mock`].

pub mod mqtt;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;

use crate::bench::{QosLevel, SessionSettings};
use crate::utils::SessionError;

/// Fired exactly once when a published message is confirmed delivered.
/// Mutually exclusive with an error return from the `publish` call itself.
pub type DeliveryCallback = Box<dyn FnOnce() + Send + 'static>;

/// Fired once per message received on a subscription, for the
/// subscription's lifetime.
pub type MessageCallback = Box<dyn Fn(&str) + Send + Sync + 'static>;

/// One simulated client's session with the broker.
///
/// A session is driven by a single worker: calls are sequential per
/// instance. `disconnect` is idempotent and safe after a failed `connect`.
#[async_trait]
pub trait SessionClient: Send {
    /// Establish the session. One attempt, no retry.
    async fn connect(&mut self) -> Result<(), SessionError>;

    /// Release the session. Never errors, never blocks indefinitely.
    async fn disconnect(&mut self);

    /// Publish one message. On success `on_delivered` fires asynchronously
    /// exactly once; on an immediate error return it never fires.
    async fn publish(
        &self,
        topic: &str,
        qos: QosLevel,
        retained: bool,
        payload: &str,
        on_delivered: DeliveryCallback,
    ) -> Result<(), SessionError>;

    /// Register a subscription; `on_message` fires once per received
    /// message until the session ends.
    async fn subscribe(
        &self,
        topic: &str,
        qos: QosLevel,
        retained: bool,
        on_message: MessageCallback,
    ) -> Result<(), SessionError>;
}

/// Creates one session per worker from its derived settings.
pub trait SessionFactory: Send + Sync {
    type Client: SessionClient + Send + 'static;

    fn create(&self, settings: &SessionSettings) -> Self::Client;
}

pub use mqtt::{MqttSession, MqttSessionFactory};
