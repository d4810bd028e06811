//! Error types for mqtt-benchmark

use thiserror::Error;

/// Validation failure kinds for benchmark spec construction
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecErrorKind {
    #[error("clients must be at least 1")]
    InvalidClients,

    #[error("delay must not be negative")]
    InvalidDelay,

    #[error("host must not be empty")]
    EmptyHost,

    #[error("topic must not be empty")]
    EmptyTopic,

    #[error("port must not be zero")]
    InvalidPort,

    #[error("qos must be 0, 1, or 2")]
    InvalidQos,
}

/// Spec construction error, attributed to the component and operation
/// that rejected the input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{component}.{operation}: {kind}")]
pub struct SpecError {
    pub component: &'static str,
    pub operation: &'static str,
    pub kind: SpecErrorKind,
}

impl SpecError {
    pub fn new(component: &'static str, operation: &'static str, kind: SpecErrorKind) -> Self {
        Self {
            component,
            operation,
            kind,
        }
    }
}

/// Errors surfaced by the client capability (connect/publish/subscribe)
///
/// These are never returned from a benchmark run; runners log them and
/// fold them into the run counters.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to connect to {host}:{port}: {reason}")]
    ConnectFailed {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("connection refused by broker: {0}")]
    ConnectRejected(String),

    #[error("publish failed: {0}")]
    PublishFailed(String),

    #[error("subscribe failed: {0}")]
    SubscribeFailed(String),

    #[error("client is not connected")]
    NotConnected,
}
