//! # Keystone Core
//!
//! Core types shared by every Keystone crate: the unified error type,
//! result aliases and logging initialization.

pub mod error;
pub mod result;
pub mod telemetry;

pub use error::*;
pub use result::*;
pub use telemetry::{init_tracing, LogFormat, LoggingConfig};
