//! mqtt-benchmark library
//!
//! Load-generation harness for MQTT brokers: connection, publish, and
//! subscribe benchmarks driven by one concurrent task per simulated
//! client.

pub mod bench;
pub mod client;
pub mod config;
pub mod shutdown;
pub mod utils;
