//! On-disk layout for bundles, staging, and the plugin store.
//!
//! ```text
//! ~/.castbridge/
//! ├── bundles/
//! │   ├── examplestream/        extracted bundle (manifest + artifact)
//! │   └── ...
//! ├── stage/
//! │   └── examplestream/        transient copy of the artifact being run
//! └── store.toml                persisted plugin metadata
//! ```

use std::path::{Path, PathBuf};

use crate::{RegistryError, RegistryResult};

/// Manages the base directory the bridge works out of.
pub struct BridgeStorage {
    base_dir: PathBuf,
}

impl BridgeStorage {
    /// Creates storage rooted at the default base directory
    /// (`~/.castbridge`).
    ///
    /// # Errors
    ///
    /// Returns an error if the directory layout cannot be created.
    pub fn new() -> RegistryResult<Self> {
        let base_dir = Self::default_base_dir()?;
        Self::with_base_dir(base_dir)
    }

    /// Creates storage rooted at a custom base directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory layout cannot be created.
    pub fn with_base_dir(base_dir: PathBuf) -> RegistryResult<Self> {
        for dir in [base_dir.join("bundles"), base_dir.join("stage")] {
            std::fs::create_dir_all(&dir).map_err(|source| RegistryError::StorageCreation {
                path: dir.clone(),
                source,
            })?;
        }

        Ok(Self { base_dir })
    }

    fn default_base_dir() -> RegistryResult<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| RegistryError::StorageCreation {
            path: PathBuf::from("~/.castbridge"),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not determine home directory",
            ),
        })?;

        Ok(home.join(".castbridge"))
    }

    /// Returns the base directory path.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Returns the extracted-bundles directory.
    #[must_use]
    pub fn bundles_dir(&self) -> PathBuf {
        self.base_dir.join("bundles")
    }

    /// Returns the staging root for transient artifact copies.
    #[must_use]
    pub fn stage_dir(&self) -> PathBuf {
        self.base_dir.join("stage")
    }

    /// Returns the plugin store file path.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.base_dir.join("store.toml")
    }

    /// Returns the bundle directory for a plugin.
    #[must_use]
    pub fn bundle_dir(&self, internal_name: &str) -> PathBuf {
        self.bundles_dir().join(sanitize_dir_name(internal_name))
    }

    /// Returns the staging directory for a plugin's artifact.
    #[must_use]
    pub fn stage_dir_for(&self, internal_name: &str) -> PathBuf {
        self.stage_dir().join(sanitize_dir_name(internal_name))
    }
}

/// Maps an arbitrary plugin id onto a safe directory name.
pub(crate) fn sanitize_dir_name(raw: &str) -> String {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();

    let trimmed = cleaned.trim_matches('-');
    if trimmed.is_empty() {
        "plugin".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_created() {
        let temp = TempDir::new().unwrap();
        let storage = BridgeStorage::with_base_dir(temp.path().to_path_buf()).unwrap();

        assert!(storage.bundles_dir().is_dir());
        assert!(storage.stage_dir().is_dir());
        assert_eq!(storage.store_path(), temp.path().join("store.toml"));
    }

    #[test]
    fn test_bundle_dir_is_sanitized() {
        let temp = TempDir::new().unwrap();
        let storage = BridgeStorage::with_base_dir(temp.path().to_path_buf()).unwrap();

        let dir = storage.bundle_dir("Example Stream/../X");
        assert_eq!(dir, storage.bundles_dir().join("example-stream-..-x"));
    }

    #[test]
    fn test_sanitize_dir_name() {
        assert_eq!(sanitize_dir_name("ExampleStream"), "examplestream");
        assert_eq!(sanitize_dir_name("a b/c"), "a-b-c");
        assert_eq!(sanitize_dir_name("---"), "plugin");
        assert_eq!(sanitize_dir_name(""), "plugin");
    }
}
