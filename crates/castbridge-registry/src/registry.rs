//! Process-scoped capability registry.
//!
//! One registry instance owns the loader, the persisted store, and every
//! lookup structure. It is constructed explicitly by the host and passed
//! to callers; there is no global instance.
//!
//! Concurrency contract: every mutation (load, unload, reload, clear)
//! holds the single registry lock for its full duration, so at most one
//! lifecycle operation is in flight at any instant. Lookups never touch
//! the lock: they read `ArcSwap` snapshots that mutations replace
//! wholesale, so a reader observes either the pre- or post-mutation
//! state, never a torn one. A reader can be stale by at most one
//! in-flight mutation, which callers treat as "not found yet".

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use castbridge_capability::{BundleRuntime, ExtractorCapability, ProviderCapability};

use crate::loader::{BundleLoader, LoadedPlugin};
use crate::storage::BridgeStorage;
use crate::store::{PluginMetadata, PluginStatus, PluginStore};

/// One extractor in the registry's global set, tagged with the plugin
/// that can drive it.
#[derive(Debug, Clone)]
pub struct RegisteredExtractor {
    /// The extractor capability.
    pub capability: Arc<ExtractorCapability>,
    /// The plugin instance that registered it.
    pub plugin: Arc<LoadedPlugin>,
}

/// Process-scoped mapping from plugin ids to their capabilities.
pub struct CapabilityRegistry {
    loader: BundleLoader,
    store: PluginStore,
    // Serializes all lifecycle operations (invariant: one in flight).
    mutation: Mutex<()>,
    initialized: AtomicBool,
    providers: ArcSwap<HashMap<String, Arc<ProviderCapability>>>,
    plugins: ArcSwap<HashMap<String, Arc<LoadedPlugin>>>,
    // Registration order preserved; extraction matching iterates this.
    extractors: ArcSwap<Vec<RegisteredExtractor>>,
}

impl CapabilityRegistry {
    /// Creates an empty registry over the given runtime, storage, and
    /// persisted store.
    #[must_use]
    pub fn new(
        runtime: Arc<dyn BundleRuntime>,
        storage: Arc<BridgeStorage>,
        store: PluginStore,
    ) -> Self {
        Self {
            loader: BundleLoader::new(runtime, storage),
            store,
            mutation: Mutex::new(()),
            initialized: AtomicBool::new(false),
            providers: ArcSwap::from_pointee(HashMap::new()),
            plugins: ArcSwap::from_pointee(HashMap::new()),
            extractors: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Loads every installed plugin from the persisted store.
    ///
    /// Idempotent: only the first call does work. Returns the number of
    /// plugins loaded by this call.
    pub fn initialize(&self) -> usize {
        let _guard = self
            .mutation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self.initialized.load(Ordering::SeqCst) {
            tracing::debug!("registry already initialized");
            return 0;
        }

        let mut count = 0;
        for metadata in self.store.list() {
            if metadata.status != PluginStatus::Installed {
                continue;
            }

            let Some(local_path) = &metadata.local_path else {
                tracing::warn!(
                    "plugin {} has no local bundle path, skipping",
                    metadata.internal_name
                );
                continue;
            };
            if !local_path.is_dir() {
                tracing::warn!(
                    "bundle directory does not exist for {}, skipping",
                    metadata.internal_name
                );
                continue;
            }

            match self.loader.load(local_path, &metadata.internal_name) {
                Ok(plugin) => {
                    self.register(&plugin);
                    count += 1;
                }
                Err(e) => {
                    tracing::warn!("failed to load plugin {}: {e}", metadata.internal_name);
                }
            }
        }

        self.initialized.store(true, Ordering::SeqCst);
        tracing::info!("registry initialized with {count} plugins");
        count
    }

    /// Whether `initialize` has completed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Loads a bundle and registers everything it contributes.
    ///
    /// Returns false on any failure; failures never leave a partially
    /// registered plugin behind.
    pub fn load_and_register(&self, bundle_dir: &Path, internal_name: &str) -> bool {
        let _guard = self
            .mutation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match self.loader.load(bundle_dir, internal_name) {
            Ok(plugin) => {
                self.register(&plugin);
                true
            }
            Err(e) => {
                tracing::error!("failed to load plugin {internal_name}: {e}");
                false
            }
        }
    }

    /// Unloads a plugin, removing every capability it owned from every
    /// lookup structure. Never fails; returns whether anything was
    /// removed.
    pub fn unload_and_unregister(&self, internal_name: &str) -> bool {
        let _guard = self
            .mutation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let unregistered = self.unregister(internal_name);
        let unloaded = self.loader.unload(internal_name);
        unregistered || unloaded
    }

    /// Unregisters every loaded plugin, then reloads from the store.
    ///
    /// The registry reaches an empty state before anything is reloaded,
    /// so a changed bundle on disk is picked up rather than served from
    /// cache. Returns the number of plugins successfully reloaded.
    pub fn reload_all(&self) -> usize {
        let _guard = self
            .mutation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let ids: Vec<String> = self.plugins.load().keys().cloned().collect();
        for id in &ids {
            self.unregister(id);
            self.loader.unload(id);
        }

        let loaded = self.loader.reload_all(&self.store);
        for plugin in &loaded {
            self.register(plugin);
        }

        loaded.len()
    }

    /// Empties the registry and the loader cache entirely.
    pub fn clear_all(&self) {
        let _guard = self
            .mutation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        self.providers.store(Arc::new(HashMap::new()));
        self.plugins.store(Arc::new(HashMap::new()));
        self.extractors.store(Arc::new(Vec::new()));
        self.loader.clear_all();
        self.initialized.store(false, Ordering::SeqCst);

        tracing::info!("cleared all registered plugins");
    }

    // Callers hold the mutation lock.
    fn register(&self, plugin: &Arc<LoadedPlugin>) {
        let internal_name = plugin.internal_name();

        if plugin.providers().is_empty() {
            tracing::warn!("plugin {internal_name} registered without providers");
        }

        let mut plugins = HashMap::clone(&self.plugins.load_full());
        plugins.insert(internal_name.to_string(), Arc::clone(plugin));
        self.plugins.store(Arc::new(plugins));

        let mut providers = HashMap::clone(&self.providers.load_full());
        for provider in plugin.providers() {
            tracing::debug!("registered provider: {} ({internal_name})", provider.name);
            providers.insert(provider.name.clone(), Arc::clone(provider));
        }
        self.providers.store(Arc::new(providers));

        let mut extractors = Vec::clone(&self.extractors.load_full());
        for capability in plugin.extractors() {
            if extractors
                .iter()
                .any(|r| Arc::ptr_eq(&r.capability, capability))
            {
                continue;
            }
            tracing::debug!(
                "registered extractor: {} from plugin {internal_name}",
                capability.name
            );
            extractors.push(RegisteredExtractor {
                capability: Arc::clone(capability),
                plugin: Arc::clone(plugin),
            });
        }
        self.extractors.store(Arc::new(extractors));
    }

    // Callers hold the mutation lock.
    fn unregister(&self, internal_name: &str) -> bool {
        let mut plugins = HashMap::clone(&self.plugins.load_full());
        let Some(plugin) = plugins.remove(internal_name) else {
            return false;
        };
        self.plugins.store(Arc::new(plugins));

        let mut providers = HashMap::clone(&self.providers.load_full());
        providers.retain(|_, v| !plugin.providers().iter().any(|p| Arc::ptr_eq(p, v)));
        self.providers.store(Arc::new(providers));

        let mut extractors = Vec::clone(&self.extractors.load_full());
        extractors.retain(|r| r.capability.owner != internal_name);
        self.extractors.store(Arc::new(extractors));

        tracing::debug!("unregistered plugin: {internal_name}");
        true
    }

    /// Looks up a provider capability, lock-free.
    ///
    /// Tries the exact key first, then falls back to a case-insensitive
    /// scan by display name, since some callers pass display names
    /// instead of ids.
    #[must_use]
    pub fn get_capability(&self, id: &str) -> Option<Arc<ProviderCapability>> {
        if id.trim().is_empty() {
            return None;
        }

        let providers = self.providers.load();
        if let Some(provider) = providers.get(id) {
            return Some(Arc::clone(provider));
        }
        providers
            .values()
            .find(|p| p.name.eq_ignore_ascii_case(id))
            .cloned()
    }

    /// Returns a registered plugin by id, lock-free.
    #[must_use]
    pub fn plugin(&self, internal_name: &str) -> Option<Arc<LoadedPlugin>> {
        self.plugins.load().get(internal_name).cloned()
    }

    /// All registered plugins.
    #[must_use]
    pub fn plugins(&self) -> Vec<Arc<LoadedPlugin>> {
        self.plugins.load().values().cloned().collect()
    }

    /// All registered provider capabilities.
    #[must_use]
    pub fn capabilities(&self) -> Vec<Arc<ProviderCapability>> {
        self.providers.load().values().cloned().collect()
    }

    /// Snapshot of the global extractor set, in registration order.
    #[must_use]
    pub fn extractors(&self) -> Arc<Vec<RegisteredExtractor>> {
        self.extractors.load_full()
    }

    /// Whether a plugin id is currently registered.
    #[must_use]
    pub fn is_registered(&self, internal_name: &str) -> bool {
        self.plugins.load().contains_key(internal_name)
    }

    /// Number of currently registered plugins.
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.plugins.load().len()
    }

    /// Persisted metadata for a plugin id.
    #[must_use]
    pub fn metadata(&self, internal_name: &str) -> Option<PluginMetadata> {
        self.store.get(internal_name)
    }

    /// The persisted plugin store.
    #[must_use]
    pub fn store(&self) -> &PluginStore {
        &self.store
    }
}
