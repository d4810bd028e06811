//! Command-line argument parsing
//!
//! Global connection flags apply to every subcommand; each benchmark mode
//! adds its own workload flags.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Benchmark tool for MQTT brokers
#[derive(Parser, Debug, Clone)]
#[command(name = "mqtt-benchmark")]
#[command(version, about, long_about = None)]
pub struct Cli {
    // ===== Connection Options =====
    /// Hostname or IP address of the MQTT broker
    #[arg(short = 'H', long = "host", default_value = "localhost", global = true)]
    pub host: String,

    /// Port number of the MQTT broker
    #[arg(short = 'P', long = "port", default_value_t = 1883, global = true)]
    pub port: u16,

    /// Client ID prefix for MQTT connections (each client appends "-<n>")
    #[arg(short = 'i', long = "client-id", default_value = "mqtt-bench-client", global = true)]
    pub client_id: String,

    /// Clean previous session state when connecting
    #[arg(
        short = 'x',
        long = "clean",
        default_value_t = true,
        action = clap::ArgAction::Set,
        global = true
    )]
    pub clean: bool,

    /// Keepalive interval in seconds
    #[arg(short = 'k', long = "keepalive", default_value_t = 60, global = true)]
    pub keepalive: u16,

    /// Username for MQTT connections
    #[arg(short = 'u', long = "username", default_value = "", global = true)]
    pub username: String,

    /// Password for MQTT connections
    #[arg(short = 'p', long = "password", default_value = "", global = true)]
    pub password: String,

    // ===== Output Options =====
    /// Enable debug logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(long = "quiet", global = true)]
    pub quiet: bool,

    /// Log output format
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Measure connection throughput by opening N concurrent connections
    Conn(ConnArgs),
    /// Measure publish throughput across N concurrent publishers
    Pub(PubArgs),
    /// Measure message delivery across N concurrent subscribers
    Sub(SubArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ConnArgs {
    /// Number of concurrent clients to connect
    #[arg(short = 'c', long = "clients", default_value_t = 100)]
    pub clients: i64,

    /// Delay between each client connection in milliseconds
    #[arg(short = 'd', long = "delay", default_value_t = 1000)]
    pub delay: i64,
}

#[derive(Args, Debug, Clone)]
pub struct PubArgs {
    /// Number of concurrent publisher clients
    #[arg(short = 'c', long = "clients", default_value_t = 100)]
    pub clients: i64,

    /// Delay between messages in milliseconds
    #[arg(short = 'd', long = "delay", default_value_t = 1000)]
    pub delay: i64,

    /// Number of messages to publish per client
    #[arg(short = 'n', long = "count", default_value_t = 1000)]
    pub count: u32,

    /// Quality of service level (0, 1, 2)
    #[arg(short = 'q', long = "qos", default_value_t = 0)]
    pub qos: u8,

    /// Topic to publish messages to
    #[arg(short = 't', long = "topic", default_value = "bench/test")]
    pub topic: String,

    /// Message payload to publish
    #[arg(short = 'm', long = "message", default_value = "Hello, World!")]
    pub message: String,

    /// Retain the last message
    #[arg(short = 'r', long = "retain")]
    pub retain: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SubArgs {
    /// Number of concurrent subscriber clients
    #[arg(short = 'c', long = "clients", default_value_t = 100)]
    pub clients: i64,

    /// Per-message delay used to size the listening window (ms)
    #[arg(short = 'd', long = "delay", default_value_t = 1000)]
    pub delay: i64,

    /// Expected number of messages per client (sizes the listening window)
    #[arg(short = 'n', long = "count", default_value_t = 1000)]
    pub count: u32,

    /// Quality of service level (0, 1, 2)
    #[arg(short = 'q', long = "qos", default_value_t = 0)]
    pub qos: u8,

    /// Topic to subscribe to
    #[arg(short = 't', long = "topic", default_value = "bench/test")]
    pub topic: String,
}
