//! rumqttc-backed session implementation
//!
//! `connect` drives the rumqttc event loop inline until the broker
//! acknowledges the session, then hands the loop to a background task
//! that dispatches callbacks:
//! - incoming PUBLISH packets fire the registered subscription callback
//! - PUBACK/PUBCOMP packets fire queued delivery callbacks in FIFO order
//!
//! A session is used by a single worker, so publishes are sequential per
//! instance and the FIFO pending queue matches broker acknowledgements.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::task::JoinHandle;
use tracing::debug;

use super::{DeliveryCallback, MessageCallback, SessionClient, SessionFactory};
use crate::bench::{QosLevel, SessionSettings};
use crate::utils::SessionError;

// rumqttc rejects keep-alive intervals below 5 seconds.
const MIN_KEEP_ALIVE_SECS: u16 = 5;

fn to_rumqttc_qos(qos: QosLevel) -> QoS {
    match qos {
        QosLevel::AtMostOnce => QoS::AtMostOnce,
        QosLevel::AtLeastOnce => QoS::AtLeastOnce,
        QosLevel::ExactlyOnce => QoS::ExactlyOnce,
    }
}

/// Callback state shared with the event loop task
struct CallbackState {
    /// Delivery callbacks awaiting PUBACK/PUBCOMP, oldest first
    pending: Mutex<VecDeque<DeliveryCallback>>,
    /// Subscription callback, set once by `subscribe`
    on_message: Mutex<Option<MessageCallback>>,
}

/// One MQTT session over rumqttc's async client
pub struct MqttSession {
    settings: SessionSettings,
    client: Option<AsyncClient>,
    state: Arc<CallbackState>,
    driver: Option<JoinHandle<()>>,
}

impl MqttSession {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            client: None,
            state: Arc::new(CallbackState {
                pending: Mutex::new(VecDeque::new()),
                on_message: Mutex::new(None),
            }),
            driver: None,
        }
    }

    fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(
            &self.settings.client_id,
            &self.settings.host,
            self.settings.port,
        );
        if !self.settings.username.is_empty() {
            options.set_credentials(&self.settings.username, &self.settings.password);
        }
        let keep_alive = self.settings.keep_alive_secs.max(MIN_KEEP_ALIVE_SECS);
        options.set_keep_alive(Duration::from_secs(u64::from(keep_alive)));
        options.set_clean_session(self.settings.clean_session);
        options
    }

    /// Dispatch broker events to the registered callbacks until the
    /// connection ends.
    async fn drive(mut event_loop: EventLoop, state: Arc<CallbackState>) {
        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let payload = String::from_utf8_lossy(&publish.payload).into_owned();
                    let on_message = state.on_message.lock();
                    if let Some(callback) = on_message.as_ref() {
                        callback(&payload);
                    }
                }
                Ok(Event::Incoming(Packet::PubAck(_)))
                | Ok(Event::Incoming(Packet::PubComp(_))) => {
                    let callback = state.pending.lock().pop_front();
                    if let Some(callback) = callback {
                        callback();
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    debug!(error = %err, "session event loop ended");
                    break;
                }
            }
        }
    }
}

#[async_trait]
impl SessionClient for MqttSession {
    async fn connect(&mut self) -> Result<(), SessionError> {
        let (client, mut event_loop) = AsyncClient::new(self.options(), 64);

        // Poll inline until the broker accepts or refuses the session.
        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    if ack.code == ConnectReturnCode::Success {
                        break;
                    }
                    return Err(SessionError::ConnectRejected(format!("{:?}", ack.code)));
                }
                Ok(_) => continue,
                Err(err) => {
                    return Err(SessionError::ConnectFailed {
                        host: self.settings.host.clone(),
                        port: self.settings.port,
                        reason: err.to_string(),
                    });
                }
            }
        }

        let state = Arc::clone(&self.state);
        self.driver = Some(tokio::spawn(Self::drive(event_loop, state)));
        self.client = Some(client);
        Ok(())
    }

    async fn disconnect(&mut self) {
        if let Some(client) = self.client.take() {
            if let Err(err) = client.disconnect().await {
                debug!(client_id = %self.settings.client_id, error = %err, "disconnect request failed");
            }
        }
        // The driver task exits on its own once the event loop observes
        // the disconnect; dropping the handle detaches it.
        self.driver.take();
    }

    async fn publish(
        &self,
        topic: &str,
        qos: QosLevel,
        retained: bool,
        payload: &str,
        on_delivered: DeliveryCallback,
    ) -> Result<(), SessionError> {
        let client = self.client.as_ref().ok_or(SessionError::NotConnected)?;

        match qos {
            QosLevel::AtMostOnce => {
                // No broker acknowledgement at QoS 0; a successful local
                // send is the delivery signal.
                client
                    .publish(topic, QoS::AtMostOnce, retained, payload)
                    .await
                    .map_err(|err| SessionError::PublishFailed(err.to_string()))?;
                on_delivered();
            }
            QosLevel::AtLeastOnce | QosLevel::ExactlyOnce => {
                self.state.pending.lock().push_back(on_delivered);
                if let Err(err) = client
                    .publish(topic, to_rumqttc_qos(qos), retained, payload)
                    .await
                {
                    // The queued callback must never fire for a failed call.
                    self.state.pending.lock().pop_back();
                    return Err(SessionError::PublishFailed(err.to_string()));
                }
            }
        }
        Ok(())
    }

    async fn subscribe(
        &self,
        topic: &str,
        qos: QosLevel,
        _retained: bool,
        on_message: MessageCallback,
    ) -> Result<(), SessionError> {
        let client = self.client.as_ref().ok_or(SessionError::NotConnected)?;

        *self.state.on_message.lock() = Some(on_message);
        if let Err(err) = client.subscribe(topic, to_rumqttc_qos(qos)).await {
            *self.state.on_message.lock() = None;
            return Err(SessionError::SubscribeFailed(err.to_string()));
        }
        Ok(())
    }
}

/// Factory handing each worker its own rumqttc session
#[derive(Debug, Default)]
pub struct MqttSessionFactory;

impl SessionFactory for MqttSessionFactory {
    type Client = MqttSession;

    fn create(&self, settings: &SessionSettings) -> MqttSession {
        MqttSession::new(settings.clone())
    }
}
