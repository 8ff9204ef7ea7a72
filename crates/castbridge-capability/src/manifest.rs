//! Bundle manifest parsing.
//!
//! Every bundle ships a `manifest.json` produced by its build toolchain.
//! The manifest is consumed, never written, so unknown keys are ignored
//! and most fields are optional.

use std::path::Path;

use serde::Deserialize;

use crate::{BundleError, BundleResult};

/// Parsed `manifest.json` of a plugin bundle.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleManifest {
    /// Bundle display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Compiled entry artifact, relative to the bundle directory.
    ///
    /// When absent the loader falls back to searching for a `.wasm` file.
    #[serde(default)]
    pub entry_point: Option<String>,
    /// Extractor names the bundle declares it will register.
    ///
    /// Advisory only; the registration sink is the source of truth.
    #[serde(default)]
    pub extractors: Vec<String>,
    /// Bundle version counter.
    #[serde(default)]
    pub version: Option<u32>,
    /// Short description.
    #[serde(default)]
    pub description: Option<String>,
    /// Bundle authors.
    #[serde(default)]
    pub authors: Vec<String>,
    /// Source repository URL.
    #[serde(default)]
    pub repository_url: Option<String>,
    /// Primary language of the bundle's content.
    #[serde(default)]
    pub language: Option<String>,
}

impl BundleManifest {
    /// Parses a manifest from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Manifest`] if the JSON is malformed.
    pub fn from_str(raw: &str) -> BundleResult<Self> {
        serde_json::from_str(raw).map_err(|e| BundleError::Manifest {
            reason: e.to_string(),
        })
    }

    /// Reads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Manifest`] if the file cannot be read or
    /// parsed.
    pub fn from_file(path: &Path) -> BundleResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| BundleError::Manifest {
            reason: format!("{}: {e}", path.display()),
        })?;
        Self::from_str(&raw)
    }
}
