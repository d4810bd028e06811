//! Benchmark run specification
//!
//! A spec is built once from a base configuration plus an ordered list of
//! field-scoped overrides, validated, and then immutable for the run.
//! Overrides mutate only the draft owned by the builder; the caller's
//! `BaseConfig` is never touched, so one base can seed many specs.

use crate::config::BaseConfig;
use crate::utils::{SpecError, SpecErrorKind};

const COMPONENT: &str = "bench";

pub const DEFAULT_DELAY_MS: i64 = 1000;
pub const DEFAULT_CLIENTS: i64 = 100;
pub const DEFAULT_CLIENT_ID: &str = "mqtt-bench-client";
pub const DEFAULT_TOPIC: &str = "bench/test";
pub const DEFAULT_MESSAGE: &str = "Hello, World!";
pub const DEFAULT_MESSAGE_COUNT: u32 = 100;
pub const DEFAULT_KEEP_ALIVE_SECS: u16 = 60;

/// Requested delivery guarantee
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QosLevel {
    /// QoS 0
    AtMostOnce,
    /// QoS 1
    AtLeastOnce,
    /// QoS 2
    ExactlyOnce,
}

impl QosLevel {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::AtMostOnce),
            1 => Some(Self::AtLeastOnce),
            2 => Some(Self::ExactlyOnce),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::AtMostOnce => 0,
            Self::AtLeastOnce => 1,
            Self::ExactlyOnce => 2,
        }
    }
}

/// A single field override, applied in argument order (last writer wins)
#[derive(Debug, Clone)]
pub enum SpecOverride {
    Clients(i64),
    Delay(i64),
    ClientId(String),
    Topic(String),
    Message(String),
    MessageCount(u32),
    Retained(bool),
    CleanSession(bool),
    Qos(u8),
    KeepAlive(u16),
    Host(String),
    Port(u16),
    Username(String),
    Password(String),
}

/// Per-worker session settings derived from a validated spec
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub client_id: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub keep_alive_secs: u16,
    pub clean_session: bool,
}

/// Validated, immutable benchmark run specification
#[derive(Debug, Clone)]
pub struct BenchmarkSpec {
    pub clients: u32,
    pub delay_ms: u64,
    pub client_id: String,
    pub topic: String,
    pub message: String,
    pub message_count: u32,
    pub retained: bool,
    pub clean_session: bool,
    pub qos: QosLevel,
    pub keep_alive_secs: u16,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// Mutable draft the builder works on before validation
struct SpecDraft {
    clients: i64,
    delay_ms: i64,
    client_id: String,
    topic: String,
    message: String,
    message_count: u32,
    retained: bool,
    clean_session: Option<bool>,
    qos: u8,
    keep_alive_secs: u16,
    host: String,
    port: u16,
    username: String,
    password: String,
}

impl SpecDraft {
    fn from_base(base: &BaseConfig) -> Self {
        Self {
            clients: DEFAULT_CLIENTS,
            delay_ms: DEFAULT_DELAY_MS,
            client_id: DEFAULT_CLIENT_ID.to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            message: DEFAULT_MESSAGE.to_string(),
            message_count: DEFAULT_MESSAGE_COUNT,
            retained: false,
            clean_session: base.client.clean_session,
            qos: 0,
            keep_alive_secs: base.client.keep_alive_secs,
            host: base.server.host.clone(),
            port: base.server.port,
            username: base.client.username.clone(),
            password: base.client.password.clone(),
        }
    }

    fn apply(&mut self, overrides: Vec<SpecOverride>) {
        for field in overrides {
            match field {
                SpecOverride::Clients(v) => self.clients = v,
                SpecOverride::Delay(v) => self.delay_ms = v,
                SpecOverride::ClientId(v) => self.client_id = v,
                SpecOverride::Topic(v) => self.topic = v,
                SpecOverride::Message(v) => self.message = v,
                SpecOverride::MessageCount(v) => self.message_count = v,
                SpecOverride::Retained(v) => self.retained = v,
                SpecOverride::CleanSession(v) => self.clean_session = Some(v),
                SpecOverride::Qos(v) => self.qos = v,
                SpecOverride::KeepAlive(v) => self.keep_alive_secs = v,
                SpecOverride::Host(v) => self.host = v,
                SpecOverride::Port(v) => self.port = v,
                SpecOverride::Username(v) => self.username = v,
                SpecOverride::Password(v) => self.password = v,
            }
        }
    }

    /// Fixed-order validation, failing fast on the first violation, then
    /// materialization into an immutable spec. Only client_id, keep_alive,
    /// and clean_session receive silent defaults.
    fn validate(mut self) -> Result<BenchmarkSpec, SpecError> {
        let reject = |kind| SpecError::new(COMPONENT, "validate", kind);

        if self.clients <= 0 {
            return Err(reject(SpecErrorKind::InvalidClients));
        }
        if self.delay_ms < 0 {
            return Err(reject(SpecErrorKind::InvalidDelay));
        }
        if self.host.is_empty() {
            return Err(reject(SpecErrorKind::EmptyHost));
        }
        if self.topic.is_empty() {
            return Err(reject(SpecErrorKind::EmptyTopic));
        }
        if self.port == 0 {
            return Err(reject(SpecErrorKind::InvalidPort));
        }
        let qos = QosLevel::from_u8(self.qos).ok_or_else(|| reject(SpecErrorKind::InvalidQos))?;

        if self.client_id.is_empty() {
            self.client_id = DEFAULT_CLIENT_ID.to_string();
        }
        if self.keep_alive_secs == 0 {
            self.keep_alive_secs = DEFAULT_KEEP_ALIVE_SECS;
        }

        Ok(BenchmarkSpec {
            clients: self.clients as u32,
            delay_ms: self.delay_ms as u64,
            client_id: self.client_id,
            topic: self.topic,
            message: self.message,
            message_count: self.message_count,
            retained: self.retained,
            clean_session: self.clean_session.unwrap_or(true),
            qos,
            keep_alive_secs: self.keep_alive_secs,
            host: self.host,
            port: self.port,
            username: self.username,
            password: self.password,
        })
    }
}

impl BenchmarkSpec {
    /// Build a spec from base defaults plus ordered overrides.
    pub fn build(base: &BaseConfig, overrides: Vec<SpecOverride>) -> Result<Self, SpecError> {
        let mut draft = SpecDraft::from_base(base);
        draft.apply(overrides);
        draft.validate()
    }

    /// Derive the session settings for worker `index`.
    pub fn session(&self, index: u32) -> SessionSettings {
        SessionSettings {
            client_id: format!("{}-{}", self.client_id, index),
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            keep_alive_secs: self.keep_alive_secs,
            clean_session: self.clean_session,
        }
    }

    /// Total messages the run intends to move (clients x per-client count).
    pub fn total_messages(&self) -> u64 {
        u64::from(self.clients) * u64::from(self.message_count)
    }
}
