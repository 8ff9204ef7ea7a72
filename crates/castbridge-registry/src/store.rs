//! Persisted plugin metadata store.
//!
//! The store is a TOML file at `<base>/store.toml`, written by the
//! installer side and read by the registry at load time. Reads are
//! tolerant: a corrupt store logs an error and yields nothing rather
//! than taking the host down.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::storage::BridgeStorage;
use crate::{RegistryError, RegistryResult};

/// Lifecycle status of a persisted plugin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginStatus {
    /// Installed and eligible for loading.
    #[default]
    Installed,
    /// Present on disk but excluded from loading.
    Disabled,
}

/// Persisted metadata for one plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// Unique internal name; doubles as the plugin id.
    pub internal_name: String,
    /// Installed version, when the installer recorded one.
    #[serde(default)]
    pub version: Option<semver::Version>,
    /// Primary language of the plugin's content.
    #[serde(default)]
    pub language: Option<String>,
    /// Repository the bundle came from.
    #[serde(default)]
    pub repo_url: Option<String>,
    /// Extracted bundle directory on local disk.
    #[serde(default)]
    pub local_path: Option<PathBuf>,
    /// Last time the entry was written.
    pub last_updated: chrono::DateTime<chrono::Utc>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: PluginStatus,
}

impl PluginMetadata {
    /// Creates an installed entry with the current timestamp.
    #[must_use]
    pub fn installed(internal_name: impl Into<String>, local_path: Option<PathBuf>) -> Self {
        Self {
            internal_name: internal_name.into(),
            version: None,
            language: None,
            repo_url: None,
            local_path,
            last_updated: chrono::Utc::now(),
            status: PluginStatus::Installed,
        }
    }
}

/// The store file format.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    plugins: HashMap<String, PluginMetadata>,
}

/// Persisted plugin metadata store.
pub struct PluginStore {
    path: PathBuf,
    bundles_dir: PathBuf,
    // Serializes read-modify-write cycles; plain reads go straight to disk.
    write_lock: Mutex<()>,
}

impl PluginStore {
    /// Opens the store backed by the given storage layout.
    #[must_use]
    pub fn new(storage: &BridgeStorage) -> Self {
        Self {
            path: storage.store_path(),
            bundles_dir: storage.bundles_dir(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_file(&self) -> StoreFile {
        if !self.path.exists() {
            return StoreFile::default();
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!("failed to read plugin store: {e}");
                return StoreFile::default();
            }
        };

        match toml::from_str(&content) {
            Ok(file) => file,
            Err(e) => {
                tracing::error!("failed to parse plugin store: {e}");
                StoreFile::default()
            }
        }
    }

    fn write_file(&self, file: &StoreFile) -> RegistryResult<()> {
        let content = toml::to_string_pretty(file).map_err(RegistryError::StoreSerialize)?;
        std::fs::write(&self.path, content).map_err(RegistryError::StoreWrite)?;
        Ok(())
    }

    /// Lists all persisted plugins.
    #[must_use]
    pub fn list(&self) -> Vec<PluginMetadata> {
        self.read_file().plugins.into_values().collect()
    }

    /// Gets a persisted plugin by internal name.
    #[must_use]
    pub fn get(&self, internal_name: &str) -> Option<PluginMetadata> {
        self.read_file().plugins.remove(internal_name)
    }

    /// Inserts or replaces a plugin entry, refreshing its timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the store file cannot be written.
    pub fn upsert(&self, mut metadata: PluginMetadata) -> RegistryResult<PluginMetadata> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        metadata.last_updated = chrono::Utc::now();

        let mut file = self.read_file();
        file.plugins
            .insert(metadata.internal_name.clone(), metadata.clone());
        self.write_file(&file)?;

        Ok(metadata)
    }

    /// Removes a plugin entry and deletes its bundle directory.
    ///
    /// Returns false when no such entry existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store file cannot be written.
    pub fn remove(&self, internal_name: &str) -> RegistryResult<bool> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut file = self.read_file();
        if file.plugins.remove(internal_name).is_none() {
            return Ok(false);
        }
        self.write_file(&file)?;

        let bundle_dir = self
            .bundles_dir
            .join(crate::storage::sanitize_dir_name(internal_name));
        if bundle_dir.exists()
            && let Err(e) = std::fs::remove_dir_all(&bundle_dir)
        {
            tracing::warn!("failed to delete bundle dir {}: {e}", bundle_dir.display());
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, PluginStore) {
        let temp = TempDir::new().unwrap();
        let storage = BridgeStorage::with_base_dir(temp.path().to_path_buf()).unwrap();
        let store = PluginStore::new(&storage);
        (temp, store)
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let (_temp, store) = create_test_store();
        assert!(store.list().is_empty());
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_upsert_and_get() {
        let (_temp, store) = create_test_store();

        store
            .upsert(PluginMetadata::installed("examplestream", None))
            .unwrap();

        let found = store.get("examplestream").unwrap();
        assert_eq!(found.internal_name, "examplestream");
        assert_eq!(found.status, PluginStatus::Installed);
    }

    #[test]
    fn test_upsert_replaces() {
        let (_temp, store) = create_test_store();

        store
            .upsert(PluginMetadata::installed("examplestream", None))
            .unwrap();

        let mut updated = PluginMetadata::installed("examplestream", None);
        updated.status = PluginStatus::Disabled;
        store.upsert(updated).unwrap();

        assert_eq!(store.list().len(), 1);
        assert_eq!(
            store.get("examplestream").unwrap().status,
            PluginStatus::Disabled
        );
    }

    #[test]
    fn test_remove() {
        let (_temp, store) = create_test_store();

        store
            .upsert(PluginMetadata::installed("examplestream", None))
            .unwrap();

        assert!(store.remove("examplestream").unwrap());
        assert!(!store.remove("examplestream").unwrap());
        assert!(store.get("examplestream").is_none());
    }

    #[test]
    fn test_remove_deletes_bundle_dir() {
        let temp = TempDir::new().unwrap();
        let storage = BridgeStorage::with_base_dir(temp.path().to_path_buf()).unwrap();
        let store = PluginStore::new(&storage);

        let bundle_dir = storage.bundle_dir("examplestream");
        std::fs::create_dir_all(&bundle_dir).unwrap();
        std::fs::write(bundle_dir.join("plugin.wasm"), b"x").unwrap();

        store
            .upsert(PluginMetadata::installed(
                "examplestream",
                Some(bundle_dir.clone()),
            ))
            .unwrap();

        assert!(store.remove("examplestream").unwrap());
        assert!(!bundle_dir.exists());
    }

    #[test]
    fn test_persistence_across_reopen() {
        let temp = TempDir::new().unwrap();

        {
            let storage = BridgeStorage::with_base_dir(temp.path().to_path_buf()).unwrap();
            let store = PluginStore::new(&storage);
            store
                .upsert(PluginMetadata::installed("examplestream", None))
                .unwrap();
        }

        {
            let storage = BridgeStorage::with_base_dir(temp.path().to_path_buf()).unwrap();
            let store = PluginStore::new(&storage);
            assert!(store.get("examplestream").is_some());
        }
    }

    #[test]
    fn test_corrupt_store_yields_nothing() {
        let temp = TempDir::new().unwrap();
        let storage = BridgeStorage::with_base_dir(temp.path().to_path_buf()).unwrap();
        std::fs::write(storage.store_path(), "not [valid toml").unwrap();

        let store = PluginStore::new(&storage);
        assert!(store.list().is_empty());
    }
}
