//! Structured logger construction.
//!
//! Everything downstream of configuration loading reports through this
//! logger, so construction failure is fatal to bootstrap.

pub mod logger;

pub use logger::{init_logger, LoggerHandle};
