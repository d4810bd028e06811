//! Scriptable in-memory session capability for runner tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{DeliveryCallback, MessageCallback, SessionClient, SessionFactory};
use crate::bench::{QosLevel, SessionSettings};
use crate::utils::SessionError;

/// What the scripted broker should do on each call
#[derive(Debug, Clone)]
pub(crate) struct MockBehavior {
    pub fail_connect: bool,
    pub fail_publish: bool,
    pub fail_subscribe: bool,
    /// Fire the delivery callback for successful publishes
    pub deliver: bool,
    /// Messages pushed to each subscriber immediately after it subscribes
    pub messages_on_subscribe: u32,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            fail_connect: false,
            fail_publish: false,
            fail_subscribe: false,
            deliver: true,
            messages_on_subscribe: 0,
        }
    }
}

/// Shared observation point for everything the workers did
#[derive(Default)]
pub(crate) struct MockLedger {
    pub connect_attempts: AtomicUsize,
    pub disconnects: AtomicUsize,
    pub publishes: AtomicUsize,
    pub subscribes: AtomicUsize,
    pub created_ids: Mutex<Vec<String>>,
}

pub(crate) struct MockFactory {
    pub behavior: MockBehavior,
    pub ledger: Arc<MockLedger>,
}

impl MockFactory {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            ledger: Arc::new(MockLedger::default()),
        }
    }
}

impl SessionFactory for MockFactory {
    type Client = MockSession;

    fn create(&self, settings: &SessionSettings) -> MockSession {
        self.ledger
            .created_ids
            .lock()
            .push(settings.client_id.clone());
        MockSession {
            behavior: self.behavior.clone(),
            ledger: Arc::clone(&self.ledger),
        }
    }
}

pub(crate) struct MockSession {
    behavior: MockBehavior,
    ledger: Arc<MockLedger>,
}

#[async_trait]
impl SessionClient for MockSession {
    async fn connect(&mut self) -> Result<(), SessionError> {
        self.ledger.connect_attempts.fetch_add(1, Ordering::Relaxed);
        if self.behavior.fail_connect {
            return Err(SessionError::ConnectFailed {
                host: "mock".to_string(),
                port: 1883,
                reason: "scripted failure".to_string(),
            });
        }
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.ledger.disconnects.fetch_add(1, Ordering::Relaxed);
    }

    async fn publish(
        &self,
        _topic: &str,
        _qos: QosLevel,
        _retained: bool,
        _payload: &str,
        on_delivered: DeliveryCallback,
    ) -> Result<(), SessionError> {
        if self.behavior.fail_publish {
            // Error return and delivery callback are mutually exclusive:
            // the callback is dropped unfired.
            return Err(SessionError::PublishFailed("scripted failure".to_string()));
        }
        self.ledger.publishes.fetch_add(1, Ordering::Relaxed);
        if self.behavior.deliver {
            on_delivered();
        }
        Ok(())
    }

    async fn subscribe(
        &self,
        _topic: &str,
        _qos: QosLevel,
        _retained: bool,
        on_message: MessageCallback,
    ) -> Result<(), SessionError> {
        if self.behavior.fail_subscribe {
            return Err(SessionError::SubscribeFailed(
                "scripted failure".to_string(),
            ));
        }
        self.ledger.subscribes.fetch_add(1, Ordering::Relaxed);
        for n in 0..self.behavior.messages_on_subscribe {
            on_message(&format!("message-{n}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disconnect_after_failed_connect_is_safe() {
        let factory = MockFactory::new(MockBehavior {
            fail_connect: true,
            ..MockBehavior::default()
        });
        let settings = SessionSettings {
            client_id: "mock-0".to_string(),
            host: "mock".to_string(),
            port: 1883,
            username: String::new(),
            password: String::new(),
            keep_alive_secs: 60,
            clean_session: true,
        };
        let mut session = factory.create(&settings);
        assert!(session.connect().await.is_err());
        session.disconnect().await;
        session.disconnect().await;
        assert_eq!(factory.ledger.disconnects.load(Ordering::Relaxed), 2);
    }
}
