//! Utility modules

pub mod error;

pub use error::{SessionError, SpecError, SpecErrorKind};
