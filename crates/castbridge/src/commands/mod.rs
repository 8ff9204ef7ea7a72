//! CLI command implementations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use castbridge_capability::BundleRuntime;
use castbridge_registry::{BridgeStorage, CapabilityRegistry, PluginStore};
use castbridge_wasm_runtime::WasmRuntime;

pub mod add;
pub mod check;
pub mod disable;
pub mod enable;
pub mod extract;
pub mod extractors;
pub mod list;
pub mod load;
pub mod providers;
pub mod reload;
pub mod remove;
pub mod unload;

/// Opens the on-disk layout rooted at `base_dir` (or the default
/// location under the home directory).
pub(crate) fn open_storage(base_dir: Option<PathBuf>) -> Result<Arc<BridgeStorage>> {
    let storage = match base_dir {
        Some(dir) => BridgeStorage::with_base_dir(dir),
        None => BridgeStorage::new(),
    }
    .context("failed to initialize bridge storage")?;
    Ok(Arc::new(storage))
}

/// Builds an empty registry over the wasm runtime and the persisted
/// store. Callers decide whether to `initialize` it.
pub(crate) fn open_registry(base_dir: Option<PathBuf>) -> Result<Arc<CapabilityRegistry>> {
    let storage = open_storage(base_dir)?;
    let store = PluginStore::new(&storage);
    let runtime: Arc<dyn BundleRuntime> =
        Arc::new(WasmRuntime::new().context("failed to create wasm runtime")?);
    Ok(Arc::new(CapabilityRegistry::new(runtime, storage, store)))
}
