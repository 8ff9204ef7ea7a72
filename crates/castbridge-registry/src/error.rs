//! Error types for the capability registry.

use std::path::PathBuf;

use castbridge_capability::BundleError;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry error taxonomy.
///
/// Everything here stays internal to the crate boundary: the exposed
/// lifecycle operations catch these, log them, and return plain
/// bool/count/Option results.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Required input missing or blank; rejected before any work.
    #[error("invalid input: {reason}")]
    Validation { reason: String },

    /// Bundle manifest missing or malformed.
    #[error("bad manifest for bundle at {}: {reason}", path.display())]
    Manifest { path: PathBuf, reason: String },

    /// No compiled entry artifact in the bundle.
    #[error("no entry artifact found in bundle at {}", path.display())]
    EntryNotFound { path: PathBuf },

    /// Entry point could not be instantiated.
    #[error("failed to instantiate plugin {name}")]
    Instantiation {
        name: String,
        #[source]
        source: BundleError,
    },

    /// Entry point failed during capability registration.
    #[error("plugin {name} failed during registration")]
    Registration {
        name: String,
        #[source]
        source: BundleError,
    },

    /// Failed to create a storage directory.
    #[error("failed to create storage directory: {}", path.display())]
    StorageCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the plugin store file.
    #[error("failed to write plugin store")]
    StoreWrite(#[source] std::io::Error),

    /// Failed to serialize the plugin store.
    #[error("failed to serialize plugin store")]
    StoreSerialize(#[source] toml::ser::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
