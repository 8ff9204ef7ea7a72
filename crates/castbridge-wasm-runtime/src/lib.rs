//! WASM bundle runtime for Castbridge plugins.
//!
//! Bundles are WebAssembly components. Each component exports the entry
//! points the host drives (`init`, optionally `extract`) and imports the
//! sink functions it reports through (`register-provider`,
//! `register-extractor`, `emit-link`, `emit-subtitle`). Payloads cross
//! the boundary as JSON strings, keeping the ABI to four host functions
//! over plain strings.

pub mod bundle;
pub mod error;

pub use bundle::WasmBundle;
pub use error::{WasmError, WasmResult};

use std::path::Path;

use wasmtime::component::Component;
use wasmtime::{Config, Engine};

use castbridge_capability::{BundleInstance, BundleResult, BundleRuntime};

/// wasmtime-backed implementation of [`BundleRuntime`].
///
/// One engine with Component Model support serves every bundle;
/// compiled components are cheap to instantiate against it.
pub struct WasmRuntime {
    engine: Engine,
}

impl WasmRuntime {
    /// Creates a runtime with a fresh engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the wasmtime engine cannot be created.
    pub fn new() -> WasmResult<Self> {
        let mut config = Config::new();
        config.wasm_component_model(true);

        let engine = Engine::new(&config).map_err(|e| WasmError::EngineCreation(e.to_string()))?;

        Ok(Self { engine })
    }

    /// Compiles a component from an artifact on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid
    /// component.
    fn load_component(&self, path: &Path) -> WasmResult<Component> {
        let bytes = std::fs::read(path)?;

        Component::from_binary(&self.engine, &bytes).map_err(|e| WasmError::ComponentLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

impl BundleRuntime for WasmRuntime {
    fn instantiate(&self, artifact: &Path) -> BundleResult<Box<dyn BundleInstance>> {
        let component = self.load_component(artifact)?;
        let bundle = WasmBundle::instantiate(&self.engine, &component)?;
        Ok(Box::new(bundle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_creation() {
        assert!(WasmRuntime::new().is_ok());
    }

    #[test]
    fn test_load_component_not_found() {
        let runtime = WasmRuntime::new().unwrap();
        let result = runtime.load_component(Path::new("/nonexistent/plugin.wasm"));
        assert!(matches!(result, Err(WasmError::Io(_))));
    }

    #[test]
    fn test_load_component_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugin.wasm");
        std::fs::write(&path, b"not a component").unwrap();

        let runtime = WasmRuntime::new().unwrap();
        let result = runtime.load_component(&path);
        assert!(matches!(result, Err(WasmError::ComponentLoad { .. })));
    }

    #[test]
    fn test_instantiate_missing_artifact() {
        let runtime = WasmRuntime::new().unwrap();
        let result = runtime.instantiate(Path::new("/nonexistent/plugin.wasm"));
        assert!(result.is_err());
    }
}
