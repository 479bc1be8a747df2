//! The startup sequencer.
//!
//! Linear control flow with one branch point at server start. The registry
//! and the hook registry are created up front; consumers wired before
//! bootstrap completes hold live references to both. Phase two and the
//! readiness signal are spawned as independent tasks strictly after the
//! listen address is known, so extension work never delays the observable
//! "listening" transition.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use casd_config::CasdConfig;
use casd_core::{
    keys, CasError, DataSourceLoader, ProcessManager, ReadinessNotifier, ServerBuilder,
};
use casd_hooks::HookRegistry;
use casd_plugins::PluginOrchestrator;
use casd_registry::DependencyRegistry;
use tracing::{debug, info};

use crate::stage::Stage;
use crate::telemetry::TelemetryClient;

/// The collaborators bootstrap is driven over. Explicitly constructed and
/// passed, never global, so tests build the sequencer fresh with mocks.
pub struct Collaborators {
    pub data_sources: Arc<dyn DataSourceLoader>,
    pub server: Arc<dyn ServerBuilder>,
    pub plugins: Arc<PluginOrchestrator>,
    pub readiness: Arc<dyn ReadinessNotifier>,
    pub process: Arc<dyn ProcessManager>,
}

pub struct Sequencer {
    config: Arc<CasdConfig>,
    registry: DependencyRegistry,
    hooks: HookRegistry,
    stage: Mutex<Stage>,
}

impl Sequencer {
    /// Construct with the registry and the (empty) hook registry created up
    /// front. The caller has already loaded configuration and installed the
    /// logger.
    pub fn new(config: Arc<CasdConfig>) -> Self {
        Self {
            config,
            registry: DependencyRegistry::new(),
            hooks: HookRegistry::standard(),
            stage: Mutex::new(Stage::LoggerReady),
        }
    }

    pub fn registry(&self) -> &DependencyRegistry {
        &self.registry
    }

    /// The shared hook registry. Handed out before any handler exists;
    /// reads stay live as phase two populates it.
    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn stage(&self) -> Stage {
        *self.stage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn advance(&self, next: Stage) {
        *self.stage.lock().unwrap_or_else(PoisonError::into_inner) = next;
        debug!(stage = next.as_str(), "bootstrap stage");
    }

    /// Drive bootstrap to the ready state. Returns the listen address, or
    /// the first fatal error; the caller logs fatals and exits with
    /// status 1.
    pub async fn run(
        &self,
        telemetry: TelemetryClient,
        collab: Collaborators,
    ) -> Result<SocketAddr, CasError> {
        self.registry
            .register(keys::NS_SERVER, keys::CONFIG, self.config.clone(), false)?;
        self.registry
            .register(keys::NS_SERVER, keys::TELEMETRY, telemetry, false)?;
        self.advance(Stage::TelemetryReady);

        self.advance(Stage::LoadingDataSources);
        let sources = collab
            .data_sources
            .load()
            .await
            .map_err(CasError::DataSourceLoad)?;
        self.registry
            .register(keys::NS_SERVER, keys::DATA_SOURCES, sources, false)?;
        self.advance(Stage::DataSourcesReady);

        // phase one plugins run immediately after the datasources are
        // registered, otherwise dependent parts cannot see them
        let instances = collab.plugins.run_phase1(&self.registry).await?;
        self.registry
            .register(keys::NS_SERVER, keys::PLUGINS, instances.clone(), false)?;
        self.advance(Stage::Phase1Complete);

        // the empty hook registry is registered before the server is built,
        // so phase-1-complete consumers already hold a reference to it
        self.registry
            .register(keys::NS_SERVER, keys::HOOKS, self.hooks.clone(), false)?;

        debug!("loading web server");
        self.advance(Stage::ServerStarting);
        let server = collab.server.build().map_err(CasError::ServerStart)?;
        self.registry
            .register(keys::NS_SERVER, keys::SERVER, server.clone(), false)?;
        let addr = server.start().await?;
        self.advance(Stage::ServerStarted);
        debug!("web server started");
        info!(
            "web server address: {}",
            server.uri().unwrap_or_else(|| format!("http://{addr}"))
        );

        collab.process.start();

        // deferred, mutually unordered: phase two and the readiness signal
        let orchestrator = collab.plugins.clone();
        let hooks = self.hooks.clone();
        let server_for_phase2 = server.clone();
        tokio::spawn(async move {
            orchestrator
                .run_phase2(&instances, server_for_phase2.as_ref(), &hooks)
                .await;
        });
        let readiness = collab.readiness.clone();
        tokio::spawn(async move { readiness.notify_ready().await });

        self.advance(Stage::Ready);
        Ok(addr)
    }
}
