//! Bootstrap stages.

use std::fmt;

/// The linear bootstrap state machine. Any transition may instead fail with
/// a stage-tagged fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Owned by the CLI: configuration is loaded before the sequencer
    /// exists, which itself starts at [`Stage::LoggerReady`].
    LoadingConfig,
    LoggerReady,
    TelemetryReady,
    LoadingDataSources,
    DataSourcesReady,
    Phase1Complete,
    ServerStarting,
    ServerStarted,
    Ready,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::LoadingConfig => "loading-config",
            Stage::LoggerReady => "logger-ready",
            Stage::TelemetryReady => "telemetry-ready",
            Stage::LoadingDataSources => "loading-datasources",
            Stage::DataSourcesReady => "datasources-ready",
            Stage::Phase1Complete => "phase1-complete",
            Stage::ServerStarting => "server-starting",
            Stage::ServerStarted => "server-started",
            Stage::Ready => "ready",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
