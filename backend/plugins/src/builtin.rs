//! Plugins shipped with the server.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use casd_core::stores::{MemoryAttributeStore, ATTRIBUTES};
use casd_core::{keys, DataSources, ServerHandle};
use casd_hooks::{
    AttributePayload, HookHandler, HookOutcome, HookPayload, HookRegistry, USER_ATTRIBUTES,
    PRE_AUTH,
};
use casd_registry::DependencyRegistry;
use tracing::info;

use crate::plugin::{CasPlugin, PluginInstance};

// ---------------------------------------------------------------------------
// attribute-resolver
// ---------------------------------------------------------------------------

/// Pre-warms the user attribute map in phase one and serves it through a
/// `userAttributes` hook in phase two.
#[derive(Default)]
pub struct AttributeResolverPlugin;

impl AttributeResolverPlugin {
    pub const NAME: &'static str = "attribute-resolver";
}

#[async_trait]
impl CasPlugin for AttributeResolverPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn init_phase1(&self, registry: &DependencyRegistry) -> Result<PluginInstance> {
        let sources: Arc<DataSources> = registry.resolve(keys::NS_SERVER, keys::DATA_SOURCES)?;
        let store = sources
            .get(ATTRIBUTES)
            .cloned()
            .and_then(|v| v.downcast::<MemoryAttributeStore>().ok())
            .context("attribute store missing from data sources")?;
        Ok(store as PluginInstance)
    }

    async fn init_phase2(
        &self,
        instance: &PluginInstance,
        _server: &dyn ServerHandle,
        hooks: &HookRegistry,
    ) -> Result<()> {
        let store = instance
            .clone()
            .downcast::<MemoryAttributeStore>()
            .ok()
            .context("phase one instance is not an attribute store")?;
        hooks.on(USER_ATTRIBUTES, Arc::new(AttributeHook { store }))?;
        Ok(())
    }
}

struct AttributeHook {
    store: Arc<MemoryAttributeStore>,
}

#[async_trait]
impl HookHandler for AttributeHook {
    fn name(&self) -> &str {
        "attribute-resolver"
    }

    async fn run(&self, payload: &HookPayload) -> Result<HookOutcome> {
        let HookPayload::UserAttributes(AttributePayload { username, .. }) = payload else {
            return Ok(HookOutcome::pass());
        };
        Ok(HookOutcome::with_attributes(
            self.store.attributes_for(username),
        ))
    }
}

// ---------------------------------------------------------------------------
// audit-log
// ---------------------------------------------------------------------------

/// Logs every authentication attempt through a `preAuth` hook.
#[derive(Default)]
pub struct AuditLogPlugin;

impl AuditLogPlugin {
    pub const NAME: &'static str = "audit-log";
}

struct AuditState;

#[async_trait]
impl CasPlugin for AuditLogPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn init_phase1(&self, _registry: &DependencyRegistry) -> Result<PluginInstance> {
        Ok(Arc::new(AuditState) as PluginInstance)
    }

    async fn init_phase2(
        &self,
        _instance: &PluginInstance,
        _server: &dyn ServerHandle,
        hooks: &HookRegistry,
    ) -> Result<()> {
        hooks.on(PRE_AUTH, Arc::new(AuditHook))?;
        Ok(())
    }
}

struct AuditHook;

#[async_trait]
impl HookHandler for AuditHook {
    fn name(&self) -> &str {
        "audit-log"
    }

    async fn run(&self, payload: &HookPayload) -> Result<HookOutcome> {
        if let HookPayload::PreAuth(p) = payload {
            info!(user = %p.username, service = %p.service, "authentication attempt");
        }
        Ok(HookOutcome::pass())
    }
}
