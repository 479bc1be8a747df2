//! `casd-config` — server configuration management.
//!
//! Provides the typed YAML schema, the loader with env-var path override,
//! and a validation pass. The loaded configuration is immutable; the
//! bootstrap core references it and never mutates it.

pub mod io;
pub mod schema;
pub mod validation;

pub use io::{config_path, load};
pub use schema::{
    CasdConfig, LoggingConfig, ServerConfig, ServiceEntry, TelemetrySettings, TicketConfig,
};
pub use validation::{validate, ValidationReport};
