//! Configuration module

pub mod base;
pub mod cli;

pub use base::{BaseConfig, ClientConfig, ServerConfig};
pub use cli::{Cli, Command, ConnArgs, LogFormat, PubArgs, SubArgs};
