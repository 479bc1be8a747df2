/// Dependency registry — namespaced singleton store.
///
/// Singletons created during bootstrap are registered at `(namespace, key)`
/// coordinates and resolved by later stages and by plugins. Registration is
/// write-once per coordinate unless the entry was registered as overwritable.
/// All writes happen on the single bootstrap control flow; the interior lock
/// only covers request-time reads that start after bootstrap completes.
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use casd_core::CasError;
use thiserror::Error;
use tracing::debug;

/// Contract violations on the registry. These surface during development and
/// testing, not at runtime in a correctly wired system.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate registration at {namespace}/{key}")]
    DuplicateRegistration { namespace: String, key: String },

    #[error("unresolved dependency {namespace}/{key}")]
    UnresolvedDependency { namespace: String, key: String },
}

impl From<RegistryError> for CasError {
    fn from(err: RegistryError) -> Self {
        CasError::Other(err.into())
    }
}

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    overwritable: bool,
}

/// Shared singleton store. Cloning yields another handle to the same entries.
#[derive(Default, Clone)]
pub struct DependencyRegistry {
    entries: Arc<RwLock<HashMap<(String, String), Entry>>>,
}

impl DependencyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a singleton at `(namespace, key)`.
    ///
    /// Fails with [`RegistryError::DuplicateRegistration`] when the
    /// coordinate is taken and the existing entry was not registered with
    /// `allow_overwrite`.
    pub fn register<T>(
        &self,
        namespace: &str,
        key: &str,
        value: T,
        allow_overwrite: bool,
    ) -> Result<(), RegistryError>
    where
        T: Any + Send + Sync,
    {
        let mut map = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let coord = (namespace.to_string(), key.to_string());
        if let Some(existing) = map.get(&coord) {
            if !existing.overwritable {
                return Err(RegistryError::DuplicateRegistration {
                    namespace: namespace.to_string(),
                    key: key.to_string(),
                });
            }
        }
        debug!(namespace, key, "registered singleton");
        map.insert(
            coord,
            Entry {
                value: Arc::new(value),
                overwritable: allow_overwrite,
            },
        );
        Ok(())
    }

    /// Resolve the singleton at `(namespace, key)` as `T`.
    ///
    /// Fails with [`RegistryError::UnresolvedDependency`] when the coordinate
    /// is absent or does not hold a `T`.
    pub fn resolve<T>(&self, namespace: &str, key: &str) -> Result<Arc<T>, RegistryError>
    where
        T: Any + Send + Sync,
    {
        let unresolved = || RegistryError::UnresolvedDependency {
            namespace: namespace.to_string(),
            key: key.to_string(),
        };
        let map = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let entry = map
            .get(&(namespace.to_string(), key.to_string()))
            .ok_or_else(unresolved)?;
        entry.value.clone().downcast::<T>().map_err(|_| unresolved())
    }

    pub fn contains(&self, namespace: &str, key: &str) -> bool {
        let map = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        map.contains_key(&(namespace.to_string(), key.to_string()))
    }

    pub fn len(&self) -> usize {
        let map = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_resolve_returns_value() {
        let registry = DependencyRegistry::new();
        registry.register("casd", "config", 42u32, false).unwrap();
        let resolved = registry.resolve::<u32>("casd", "config").unwrap();
        assert_eq!(*resolved, 42);
    }

    #[test]
    fn duplicate_registration_rejected() {
        let registry = DependencyRegistry::new();
        registry.register("casd", "config", 1u32, false).unwrap();
        let err = registry.register("casd", "config", 2u32, false).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRegistration { .. }));
        // original value untouched
        assert_eq!(*registry.resolve::<u32>("casd", "config").unwrap(), 1);
    }

    #[test]
    fn overwritable_entry_can_be_replaced() {
        let registry = DependencyRegistry::new();
        registry.register("casd", "config", 1u32, true).unwrap();
        registry.register("casd", "config", 2u32, false).unwrap();
        assert_eq!(*registry.resolve::<u32>("casd", "config").unwrap(), 2);
    }

    #[test]
    fn unresolved_dependency_reported() {
        let registry = DependencyRegistry::new();
        let err = registry.resolve::<u32>("casd", "missing").unwrap_err();
        assert!(matches!(err, RegistryError::UnresolvedDependency { .. }));
    }

    #[test]
    fn type_mismatch_is_unresolved() {
        let registry = DependencyRegistry::new();
        registry.register("casd", "config", 42u32, false).unwrap();
        assert!(registry.resolve::<String>("casd", "config").is_err());
    }

    #[test]
    fn clones_share_entries() {
        let registry = DependencyRegistry::new();
        let handle = registry.clone();
        registry.register("casd", "config", 7u32, false).unwrap();
        assert_eq!(*handle.resolve::<u32>("casd", "config").unwrap(), 7);
    }
}
