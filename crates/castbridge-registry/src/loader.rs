//! Bundle loading and capability discovery.
//!
//! The loader turns an extracted bundle directory into a [`LoadedPlugin`]:
//! it parses the manifest, locates the compiled artifact, stages a copy,
//! instantiates the entry point through the [`BundleRuntime`], and runs
//! its registration routine against a fresh [`RegistrationSink`]. The
//! sink's final contents are exactly the capabilities this bundle
//! contributed; nothing is committed when any step fails.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use castbridge_capability::{
    BundleInstance, BundleManifest, BundleResult, BundleRuntime, ExtractionSink,
    ExtractorCapability, ProviderCapability, RegistrationSink, StreamLink, SubtitleTrack,
};

use crate::storage::BridgeStorage;
use crate::store::{PluginStatus, PluginStore};
use crate::{RegistryError, RegistryResult};

const MANIFEST_FILE_NAME: &str = "manifest.json";
const ARTIFACT_SEARCH_DEPTH: u8 = 3;

/// A successfully loaded plugin and everything it registered.
///
/// Capability lists are fixed at load time; the only way to change them
/// is a full unload followed by a fresh load.
pub struct LoadedPlugin {
    internal_name: String,
    providers: Vec<Arc<ProviderCapability>>,
    extractors: Vec<Arc<ExtractorCapability>>,
    // Calls into the instance are serialized; extraction holds only
    // this lock, never the registry's.
    instance: Mutex<Box<dyn BundleInstance>>,
}

impl LoadedPlugin {
    /// Returns the plugin id.
    #[must_use]
    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }

    /// Provider capabilities this plugin registered.
    #[must_use]
    pub fn providers(&self) -> &[Arc<ProviderCapability>] {
        &self.providers
    }

    /// Extractor capabilities this plugin registered.
    #[must_use]
    pub fn extractors(&self) -> &[Arc<ExtractorCapability>] {
        &self.extractors
    }

    /// Drives one of this plugin's extractors against a URL.
    ///
    /// Returns whether the extractor matched, plus everything it
    /// surfaced.
    ///
    /// # Errors
    ///
    /// Returns an error when the call into the bundle itself fails.
    pub fn run_extractor(
        &self,
        extractor: &str,
        url: &str,
        referer: Option<&str>,
    ) -> BundleResult<(bool, Vec<StreamLink>, Vec<SubtitleTrack>)> {
        let mut instance = self
            .instance
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut sink = ExtractionSink::new();
        let matched = instance.extract(extractor, url, referer, &mut sink)?;
        let (links, subtitles) = sink.into_parts();
        Ok((matched, links, subtitles))
    }
}

impl fmt::Debug for LoadedPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedPlugin")
            .field("internal_name", &self.internal_name)
            .field("providers", &self.providers.len())
            .field("extractors", &self.extractors.len())
            .finish()
    }
}

/// Loads bundles and caches the resulting plugin instances.
pub struct BundleLoader {
    runtime: Arc<dyn BundleRuntime>,
    storage: Arc<BridgeStorage>,
    cache: Mutex<HashMap<String, Arc<LoadedPlugin>>>,
}

impl BundleLoader {
    /// Creates a loader over the given runtime and storage layout.
    pub fn new(runtime: Arc<dyn BundleRuntime>, storage: Arc<BridgeStorage>) -> Self {
        Self {
            runtime,
            storage,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Loads a bundle, discovering the capabilities it contributes.
    ///
    /// A plugin already in the cache is returned as-is; the entry
    /// point's registration routine runs at most once per load cycle.
    ///
    /// # Errors
    ///
    /// Returns an error naming the failing step; on failure nothing is
    /// cached and no staged artifact is left behind.
    pub fn load(&self, bundle_dir: &Path, internal_name: &str) -> RegistryResult<Arc<LoadedPlugin>> {
        if internal_name.trim().is_empty() {
            return Err(RegistryError::Validation {
                reason: "plugin id must not be blank".to_string(),
            });
        }

        if let Some(cached) = self.cached(internal_name) {
            tracing::debug!("plugin {internal_name} already loaded, returning cached instance");
            return Ok(cached);
        }

        if !bundle_dir.is_dir() {
            return Err(RegistryError::Manifest {
                path: bundle_dir.to_path_buf(),
                reason: "bundle directory does not exist".to_string(),
            });
        }

        let manifest = read_manifest(bundle_dir)?;
        let artifact = locate_artifact(bundle_dir, &manifest)?;
        let staged = self.stage_artifact(internal_name, &artifact)?;

        let plugin = match self.instantiate_and_register(internal_name, &manifest, &staged) {
            Ok(plugin) => plugin,
            Err(e) => {
                // Failed loads leave no staging residue.
                self.remove_stage_dir(internal_name);
                return Err(e);
            }
        };

        tracing::info!(
            "loaded plugin {internal_name} with {} providers and {} extractors",
            plugin.providers.len(),
            plugin.extractors.len()
        );

        let plugin = Arc::new(plugin);
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(internal_name.to_string(), Arc::clone(&plugin));

        Ok(plugin)
    }

    fn instantiate_and_register(
        &self,
        internal_name: &str,
        manifest: &BundleManifest,
        artifact: &Path,
    ) -> RegistryResult<LoadedPlugin> {
        let mut instance =
            self.runtime
                .instantiate(artifact)
                .map_err(|source| RegistryError::Instantiation {
                    name: internal_name.to_string(),
                    source,
                })?;

        let mut sink = RegistrationSink::new();
        instance
            .init(&mut sink)
            .map_err(|source| RegistryError::Registration {
                name: internal_name.to_string(),
                source,
            })?;

        if sink.provider_count() == 0 {
            tracing::warn!("plugin {internal_name} registered no providers");
        }

        let (providers, extractors) = sink.into_parts();

        let registered: Vec<&str> = extractors.iter().map(|e| e.name.as_str()).collect();
        for declared in &manifest.extractors {
            if !registered
                .iter()
                .any(|name| name.eq_ignore_ascii_case(declared))
            {
                tracing::warn!(
                    "plugin {internal_name} declared extractor '{declared}' but never registered it"
                );
            }
        }

        let extractors = extractors
            .into_iter()
            .map(|mut e| {
                e.owner = internal_name.to_string();
                Arc::new(e)
            })
            .collect();

        Ok(LoadedPlugin {
            internal_name: internal_name.to_string(),
            providers: providers.into_iter().map(Arc::new).collect(),
            extractors,
            instance: Mutex::new(instance),
        })
    }

    /// Copies the artifact into the plugin's staging directory and
    /// returns the staged path.
    fn stage_artifact(&self, internal_name: &str, artifact: &Path) -> RegistryResult<PathBuf> {
        let stage_dir = self.storage.stage_dir_for(internal_name);
        std::fs::create_dir_all(&stage_dir).map_err(|source| RegistryError::StorageCreation {
            path: stage_dir.clone(),
            source,
        })?;

        let file_name = artifact.file_name().unwrap_or_default();
        let staged = stage_dir.join(file_name);
        std::fs::copy(artifact, &staged)?;
        Ok(staged)
    }

    fn remove_stage_dir(&self, internal_name: &str) {
        let stage_dir = self.storage.stage_dir_for(internal_name);
        if stage_dir.exists()
            && let Err(e) = std::fs::remove_dir_all(&stage_dir)
        {
            tracing::warn!("failed to delete stage dir {}: {e}", stage_dir.display());
        }
    }

    /// Drops a plugin from the cache and deletes its staging directory.
    ///
    /// Returns whether a cached instance existed. Never fails.
    pub fn unload(&self, internal_name: &str) -> bool {
        let removed = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(internal_name)
            .is_some();

        self.remove_stage_dir(internal_name);

        if removed {
            tracing::info!("unloaded plugin {internal_name}");
        }
        removed
    }

    /// Loads every installed plugin recorded in the store.
    ///
    /// Entries without a resolvable bundle path are skipped; individual
    /// load failures are logged and skipped, not fatal.
    pub fn reload_all(&self, store: &PluginStore) -> Vec<Arc<LoadedPlugin>> {
        let mut loaded = Vec::new();

        for metadata in store.list() {
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

            match self.load(local_path, &metadata.internal_name) {
                Ok(plugin) => loaded.push(plugin),
                Err(e) => {
                    tracing::warn!("failed to load plugin {}: {e}", metadata.internal_name);
                }
            }
        }

        tracing::info!("reloaded {} plugins", loaded.len());
        loaded
    }

    /// Drops every cached plugin and the whole staging root.
    pub fn clear_all(&self) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        let stage_root = self.storage.stage_dir();
        if stage_root.exists() {
            if let Err(e) = std::fs::remove_dir_all(&stage_root) {
                tracing::warn!("failed to clear stage root: {e}");
            }
            if let Err(e) = std::fs::create_dir_all(&stage_root) {
                tracing::warn!("failed to recreate stage root: {e}");
            }
        }

        tracing::info!("cleared all cached plugins");
    }

    /// Returns the cached plugin for an id, if loaded.
    #[must_use]
    pub fn cached(&self, internal_name: &str) -> Option<Arc<LoadedPlugin>> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(internal_name)
            .cloned()
    }

    /// Number of plugins currently cached.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Reads the bundle manifest, searching one directory level deep when it
/// is not at the bundle root.
fn read_manifest(bundle_dir: &Path) -> RegistryResult<BundleManifest> {
    let direct = bundle_dir.join(MANIFEST_FILE_NAME);
    if direct.is_file() {
        return parse_manifest(bundle_dir, &direct);
    }

    if let Ok(entries) = std::fs::read_dir(bundle_dir) {
        for entry in entries.flatten() {
            let candidate = entry.path().join(MANIFEST_FILE_NAME);
            if candidate.is_file() {
                return parse_manifest(bundle_dir, &candidate);
            }
        }
    }

    Err(RegistryError::Manifest {
        path: bundle_dir.to_path_buf(),
        reason: format!("{MANIFEST_FILE_NAME} not found"),
    })
}

fn parse_manifest(bundle_dir: &Path, manifest_path: &Path) -> RegistryResult<BundleManifest> {
    BundleManifest::from_file(manifest_path).map_err(|e| RegistryError::Manifest {
        path: bundle_dir.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Locates the compiled entry artifact: the manifest's `entry_point` if
/// named, otherwise the first `.wasm` file found in the bundle.
fn locate_artifact(bundle_dir: &Path, manifest: &BundleManifest) -> RegistryResult<PathBuf> {
    if let Some(entry) = &manifest.entry_point {
        let path = bundle_dir.join(entry);
        if path.is_file() {
            return Ok(path);
        }
        return Err(RegistryError::EntryNotFound {
            path: bundle_dir.to_path_buf(),
        });
    }

    find_wasm_artifact(bundle_dir, ARTIFACT_SEARCH_DEPTH).ok_or_else(|| {
        RegistryError::EntryNotFound {
            path: bundle_dir.to_path_buf(),
        }
    })
}

fn find_wasm_artifact(dir: &Path, depth: u8) -> Option<PathBuf> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .flatten()
        .map(|e| e.path())
        .collect();
    entries.sort();

    for path in &entries {
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("wasm"))
        {
            return Some(path.clone());
        }
    }

    if depth > 1 {
        for path in &entries {
            if path.is_dir()
                && let Some(found) = find_wasm_artifact(path, depth - 1)
            {
                return Some(found);
            }
        }
    }

    None
}
