//! The two-phase plugin contract.
//!
//! Phase one runs before the web server exists: a plugin may read the
//! dependency registry, pre-warm caches, or mutate configuration-adjacent
//! state, and must not assume a live listener. Phase two runs after the
//! server is accepting connections: a plugin receives its own phase-one
//! instance, the live server handle, and the shared hook registry. The
//! orchestrator enforces the ordering; plugins are not trusted to.

use std::any::Any;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use casd_core::ServerHandle;
use casd_hooks::HookRegistry;
use casd_registry::DependencyRegistry;

/// Opaque per-plugin state created in phase one and kept for the process
/// lifetime.
pub type PluginInstance = Arc<dyn Any + Send + Sync>;

#[async_trait]
pub trait CasPlugin: Send + Sync {
    /// Stable plugin identifier, as referenced in the configured plugin list.
    fn name(&self) -> &str;

    /// Phase one: runs before the server is constructed. A failure here is
    /// fatal to bootstrap.
    async fn init_phase1(&self, registry: &DependencyRegistry) -> Result<PluginInstance>;

    /// Phase two: runs after the server is accepting connections. May
    /// register hooks or start background work. Failures are isolated per
    /// plugin and never take the running server down.
    async fn init_phase2(
        &self,
        instance: &PluginInstance,
        server: &dyn ServerHandle,
        hooks: &HookRegistry,
    ) -> Result<()> {
        let _ = (instance, server, hooks);
        Ok(())
    }
}
