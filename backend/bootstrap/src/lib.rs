//! Startup sequencing.
//!
//! The sequencer drives bootstrap as a linear state machine: register core
//! singletons, load data sources, run plugin phase one, build and start the
//! web server, then defer plugin phase two and the readiness signal. Every
//! stage fully completes or fails before the next begins; a fatal failure
//! propagates to the caller, which logs it and exits with status 1.

pub mod sequencer;
pub mod sources;
pub mod stage;
pub mod telemetry;

pub use sequencer::{Collaborators, Sequencer};
pub use sources::ConfiguredDataSourceLoader;
pub use stage::Stage;
pub use telemetry::TelemetryClient;
