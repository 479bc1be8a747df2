/// Plugin orchestrator — drives the two-phase lifecycle.
///
/// Phase one is fatal on the first failure: later phases may assume every
/// declared plugin is live, so there is no partial-failure tolerance before
/// the server exists. Phase two is the one place partial failure is
/// tolerated: the server is already serving traffic, and a misbehaving
/// extension must not take it down or block its siblings.
use std::sync::Arc;

use casd_core::{CasError, ServerHandle};
use casd_hooks::HookRegistry;
use casd_registry::DependencyRegistry;
use indexmap::IndexMap;
use tracing::{debug, error, info};

use crate::plugin::{CasPlugin, PluginInstance};

/// Phase-one results, keyed by plugin id in declaration order.
pub type PluginInstances = IndexMap<String, PluginInstance>;

pub struct PluginOrchestrator {
    plugins: Vec<Arc<dyn CasPlugin>>,
}

impl std::fmt::Debug for PluginOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginOrchestrator")
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl PluginOrchestrator {
    /// Build from an already-resolved plugin set, in declaration order.
    pub fn new(plugins: Vec<Arc<dyn CasPlugin>>) -> Self {
        Self { plugins }
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Run every plugin's phase-one initialization, strictly before the
    /// server is constructed. The first failure aborts bootstrap.
    pub async fn run_phase1(
        &self,
        registry: &DependencyRegistry,
    ) -> Result<PluginInstances, CasError> {
        let mut instances = PluginInstances::new();
        for plugin in &self.plugins {
            debug!(plugin = plugin.name(), "running phase one initialization");
            let instance = plugin.init_phase1(registry).await.map_err(|source| {
                CasError::PluginPhase1 {
                    plugin: plugin.name().to_string(),
                    source,
                }
            })?;
            instances.insert(plugin.name().to_string(), instance);
        }
        info!(count = instances.len(), "phase one plugin initialization complete");
        Ok(instances)
    }

    /// Run every plugin's phase-two initialization, strictly after the
    /// server has begun listening. Failures are logged and isolated; the
    /// return value is the number of plugins that failed.
    pub async fn run_phase2(
        &self,
        instances: &PluginInstances,
        server: &dyn ServerHandle,
        hooks: &HookRegistry,
    ) -> usize {
        let mut failed = 0;
        for plugin in &self.plugins {
            let Some(instance) = instances.get(plugin.name()) else {
                error!(
                    plugin = plugin.name(),
                    "phase two invoked without a phase one instance; skipping"
                );
                failed += 1;
                continue;
            };
            debug!(plugin = plugin.name(), "running phase two initialization");
            if let Err(source) = plugin.init_phase2(instance, server, hooks).await {
                let err = CasError::PluginPhase2 {
                    plugin: plugin.name().to_string(),
                    source,
                };
                error!("{err}");
                failed += 1;
            }
        }
        info!(
            count = self.plugins.len() - failed,
            failed, "phase two plugin initialization complete"
        );
        failed
    }
}
