//! Base configuration supplying per-run defaults
//!
//! The spec builder copies these values into its own draft; it never
//! mutates the caller's `BaseConfig`, so one base can safely seed any
//! number of concurrent runs.

/// MQTT client defaults shared by every simulated session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub client_id: String,
    pub username: String,
    pub password: String,
    pub keep_alive_secs: u16,
    /// `None` means "unset"; the builder resolves it to `true`.
    pub clean_session: Option<bool>,
}

/// Broker endpoint defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Complete base configuration handed to the spec builder.
#[derive(Debug, Clone)]
pub struct BaseConfig {
    pub client: ClientConfig,
    pub server: ServerConfig,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig {
                client_id: String::new(),
                username: String::new(),
                password: String::new(),
                keep_alive_secs: 60,
                clean_session: None,
            },
            server: ServerConfig {
                host: "localhost".to_string(),
                port: 1883,
            },
        }
    }
}
