//! Plugin catalog: resolves configured plugin names to factories.
//!
//! The configuration declares the installed plugin set as an ordered list of
//! names; the catalog maps each name to a constructor. An unknown name is a
//! configuration error surfaced before phase one runs.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use casd_core::CasError;

use crate::builtin::{AttributeResolverPlugin, AuditLogPlugin};
use crate::orchestrator::PluginOrchestrator;
use crate::plugin::CasPlugin;

type PluginFactory = fn() -> Arc<dyn CasPlugin>;

pub struct PluginCatalog {
    factories: HashMap<String, PluginFactory>,
}

impl PluginCatalog {
    /// Catalog of the plugins shipped with the server.
    pub fn builtin() -> Self {
        let mut catalog = Self {
            factories: HashMap::new(),
        };
        catalog.add(AttributeResolverPlugin::NAME, || {
            Arc::new(AttributeResolverPlugin::default())
        });
        catalog.add(AuditLogPlugin::NAME, || Arc::new(AuditLogPlugin::default()));
        catalog
    }

    pub fn add(&mut self, name: &str, factory: PluginFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> Option<Arc<dyn CasPlugin>> {
        self.factories.get(name).map(|f| f())
    }

    /// Resolve the configured plugin list, in declaration order, into an
    /// orchestrator.
    pub fn orchestrator_for(&self, names: &[String]) -> Result<PluginOrchestrator, CasError> {
        let mut plugins = Vec::with_capacity(names.len());
        for name in names {
            let plugin = self
                .create(name)
                .ok_or_else(|| CasError::ConfigLoad(anyhow!("unknown plugin '{name}'")))?;
            plugins.push(plugin);
        }
        Ok(PluginOrchestrator::new(plugins))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_resolves_shipped_plugins() {
        let catalog = PluginCatalog::builtin();
        let orchestrator = catalog
            .orchestrator_for(&["attribute-resolver".to_string(), "audit-log".to_string()])
            .unwrap();
        assert_eq!(orchestrator.len(), 2);
    }

    #[test]
    fn unknown_plugin_is_a_config_error() {
        let catalog = PluginCatalog::builtin();
        let err = catalog
            .orchestrator_for(&["does-not-exist".to_string()])
            .unwrap_err();
        assert!(matches!(err, CasError::ConfigLoad(_)));
        assert!(err.to_string().contains("does-not-exist"));
    }
}
