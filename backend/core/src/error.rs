use thiserror::Error;
use tracing::{debug, error};

/// Top-level error type for the casd bootstrap.
///
/// The first five variants are fatal to process startup; callers log them
/// through [`report_fatal`] and exit with status 1. `PluginPhase2` is the one
/// non-fatal variant: the orchestrator logs it and keeps the server running.
#[derive(Debug, Error)]
pub enum CasError {
    #[error("could not load configuration: {0}")]
    ConfigLoad(#[source] anyhow::Error),

    #[error("could not load datasources: {0}")]
    DataSourceLoad(#[source] anyhow::Error),

    #[error("plugin '{plugin}' failed phase one initialization: {source}")]
    PluginPhase1 {
        plugin: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("plugin '{plugin}' failed phase two initialization: {source}")]
    PluginPhase2 {
        plugin: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("could not start web server: {0}")]
    ServerStart(#[source] anyhow::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Log a fatal bootstrap failure: one human-readable line at error level,
/// then the full cause chain at debug level.
pub fn report_fatal(err: &CasError) {
    error!("{err}");
    let mut cause = std::error::Error::source(err);
    while let Some(c) = cause {
        debug!("caused by: {c}");
        cause = c.source();
    }
}
