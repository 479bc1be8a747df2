//! Data-source loading.
//!
//! Builds the named singleton map from configuration: the service registry,
//! the ticket store, and the attribute store. Loading failure is fatal to
//! bootstrap; there is no retry, the process supervisor restarts us instead.

use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use casd_config::CasdConfig;
use casd_core::stores::{
    MemoryAttributeStore, MemoryServiceRegistry, MemoryTicketStore, RegisteredService, ATTRIBUTES,
    SERVICE_REGISTRY, TICKET_REGISTRY,
};
use casd_core::{DataSourceLoader, DataSources};
use tracing::info;

pub struct ConfiguredDataSourceLoader {
    config: Arc<CasdConfig>,
}

impl ConfiguredDataSourceLoader {
    pub fn new(config: Arc<CasdConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DataSourceLoader for ConfiguredDataSourceLoader {
    async fn load(&self) -> Result<DataSources> {
        let mut seen = HashSet::new();
        let mut services = Vec::with_capacity(self.config.services.len());
        for entry in &self.config.services {
            if !seen.insert(entry.name.as_str()) {
                bail!("duplicate service registration '{}'", entry.name);
            }
            services.push(RegisteredService {
                name: entry.name.clone(),
                url_prefix: entry.url_prefix.clone(),
            });
        }

        let mut sources = DataSources::new();
        sources.insert(
            SERVICE_REGISTRY.to_string(),
            Arc::new(MemoryServiceRegistry::new(services)) as Arc<dyn Any + Send + Sync>,
        );
        sources.insert(
            TICKET_REGISTRY.to_string(),
            Arc::new(MemoryTicketStore::new(self.config.tickets.ttl_secs))
                as Arc<dyn Any + Send + Sync>,
        );
        sources.insert(
            ATTRIBUTES.to_string(),
            Arc::new(MemoryAttributeStore::new(self.config.attributes.clone()))
                as Arc<dyn Any + Send + Sync>,
        );
        info!(
            services = self.config.services.len(),
            "datasources loaded"
        );
        Ok(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casd_config::ServiceEntry;

    #[tokio::test]
    async fn loads_all_three_sources() {
        let mut config = CasdConfig::default();
        config.services.push(ServiceEntry {
            name: "app".to_string(),
            url_prefix: "https://app.example.com/".to_string(),
        });
        let loader = ConfiguredDataSourceLoader::new(Arc::new(config));
        let sources = loader.load().await.unwrap();
        assert!(sources.contains_key(SERVICE_REGISTRY));
        assert!(sources.contains_key(TICKET_REGISTRY));
        assert!(sources.contains_key(ATTRIBUTES));
    }

    #[tokio::test]
    async fn duplicate_service_names_rejected() {
        let mut config = CasdConfig::default();
        for _ in 0..2 {
            config.services.push(ServiceEntry {
                name: "app".to_string(),
                url_prefix: "https://app.example.com/".to_string(),
            });
        }
        let loader = ConfiguredDataSourceLoader::new(Arc::new(config));
        let err = loader.load().await.unwrap_err();
        assert!(err.to_string().contains("duplicate service registration"));
    }
}
