//! Process-facing collaborators: readiness notification to a supervising
//! parent and signal-driven process supervision.

pub mod readiness;
pub mod signals;

pub use readiness::SdNotify;
pub use signals::SignalSupervisor;
