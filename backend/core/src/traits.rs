//! Collaborator traits consumed by the startup sequencer.
//!
//! The sequencer drives bootstrap entirely through these seams so that every
//! test can construct it fresh with mock collaborators.

use std::any::Any;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::error::CasError;

/// Named singleton map produced by the data-source loading collaborator.
///
/// Values are opaque to the bootstrap; downstream consumers downcast to the
/// concrete store types they were built with.
pub type DataSources = HashMap<String, Arc<dyn Any + Send + Sync>>;

/// Loads the data-source singletons (service registry, ticket store, ...).
///
/// Loading is asynchronous and may fail; a failure is fatal to bootstrap.
#[async_trait]
pub trait DataSourceLoader: Send + Sync {
    async fn load(&self) -> Result<DataSources>;
}

/// A constructed-but-not-yet-listening server.
#[async_trait]
pub trait ServerHandle: Send + Sync {
    /// Bind the listener and begin accepting connections.
    ///
    /// Returns the bound address on success. Must be called at most once.
    async fn start(&self) -> Result<SocketAddr, CasError>;

    /// Address descriptor, populated only after a successful [`start`].
    ///
    /// [`start`]: ServerHandle::start
    fn uri(&self) -> Option<String>;
}

/// Builds the web server. Construction happens strictly after plugin phase
/// one, so the builder may capture registry and hook references up front.
pub trait ServerBuilder: Send + Sync {
    fn build(&self) -> Result<Arc<dyn ServerHandle>>;
}

/// Sends the out-of-process readiness signal to a supervising parent.
#[async_trait]
pub trait ReadinessNotifier: Send + Sync {
    async fn notify_ready(&self);
}

/// Process-level supervision (signal handling, orderly exit).
pub trait ProcessManager: Send + Sync {
    /// Called once, synchronously, after the server reports a successful
    /// start.
    fn start(&self);
}
