//! On-demand routing from capability names to loaded plugins.

use std::sync::Arc;

use castbridge_capability::ProviderCapability;

use crate::registry::CapabilityRegistry;
use crate::store::PluginStatus;

/// Resolves capability names against the registry, loading the owning
/// plugin from the persisted store when it is installed but not yet in
/// memory.
pub struct CapabilityRouter {
    registry: Arc<CapabilityRegistry>,
}

impl CapabilityRouter {
    /// Creates a router over the given registry.
    #[must_use]
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the capability for `name`, loading its plugin on demand.
    ///
    /// Fast path is a lock-free registry lookup. On a miss the store is
    /// consulted: an installed entry whose id matches `name`
    /// (case-insensitively) is loaded and registered, then the lookup
    /// is retried. Disabled entries never load. Returns `None` when the
    /// name resolves to nothing.
    #[must_use]
    pub fn get_or_load(&self, name: &str) -> Option<Arc<ProviderCapability>> {
        if name.trim().is_empty() {
            return None;
        }

        if let Some(capability) = self.registry.get_capability(name) {
            return Some(capability);
        }

        let metadata = self
            .registry
            .store()
            .list()
            .into_iter()
            .find(|m| m.internal_name.eq_ignore_ascii_case(name))?;

        if metadata.status != PluginStatus::Installed {
            tracing::debug!("plugin {} is disabled, not loading", metadata.internal_name);
            return None;
        }
        let local_path = metadata.local_path.as_ref()?;

        tracing::info!("loading plugin {} on demand for {name}", metadata.internal_name);
        if !self
            .registry
            .load_and_register(local_path, &metadata.internal_name)
        {
            return None;
        }

        self.registry.get_capability(name)
    }

    /// The underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{PluginMetadata, PluginStatus};
    use crate::testutil::{test_registry, write_bundle};
    use tempfile::TempDir;

    fn seeded_router(temp: &TempDir, status: PluginStatus) -> CapabilityRouter {
        let (registry, _runtime) = test_registry(temp.path().join("base"));

        let bundle = temp.path().join("bundle");
        write_bundle(
            &bundle,
            r#"{"providers": [{"name": "ExampleStream", "base_url": "https://example.test"}]}"#,
        );
        let mut metadata = PluginMetadata::installed("examplestream", Some(bundle));
        metadata.status = status;
        registry.store().upsert(metadata).unwrap();

        CapabilityRouter::new(registry)
    }

    #[test]
    fn test_hit_on_registered_capability() {
        let temp = TempDir::new().unwrap();
        let router = seeded_router(&temp, PluginStatus::Installed);
        router.registry().initialize();

        assert!(router.get_or_load("ExampleStream").is_some());
    }

    #[test]
    fn test_loads_installed_plugin_on_miss() {
        let temp = TempDir::new().unwrap();
        let router = seeded_router(&temp, PluginStatus::Installed);

        assert!(!router.registry().is_registered("examplestream"));
        let capability = router.get_or_load("examplestream").unwrap();
        assert_eq!(capability.name, "ExampleStream");
        assert!(router.registry().is_registered("examplestream"));
    }

    #[test]
    fn test_does_not_load_disabled_plugin() {
        let temp = TempDir::new().unwrap();
        let router = seeded_router(&temp, PluginStatus::Disabled);

        assert!(router.get_or_load("examplestream").is_none());
        assert!(!router.registry().is_registered("examplestream"));
    }

    #[test]
    fn test_unknown_and_blank_names_resolve_to_nothing() {
        let temp = TempDir::new().unwrap();
        let router = seeded_router(&temp, PluginStatus::Installed);

        assert!(router.get_or_load("nosuch").is_none());
        assert!(router.get_or_load("").is_none());
        assert!(router.get_or_load("   ").is_none());
    }
}
