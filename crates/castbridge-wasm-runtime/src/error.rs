//! Error types for the WASM runtime.

use castbridge_capability::BundleError;
use thiserror::Error;

/// Errors that can occur in the WASM runtime.
#[derive(Debug, Error)]
pub enum WasmError {
    /// Failed to create the WASM engine.
    #[error("failed to create WASM engine: {0}")]
    EngineCreation(String),

    /// Failed to load a WASM component.
    #[error("failed to load WASM component from {path}: {reason}")]
    ComponentLoad { path: String, reason: String },

    /// Failed to instantiate a WASM component.
    #[error("failed to instantiate WASM component: {0}")]
    Instantiation(String),

    /// Failed to call a WASM function.
    #[error("failed to call WASM function '{name}': {reason}")]
    FunctionCall { name: String, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<WasmError> for BundleError {
    fn from(err: WasmError) -> Self {
        match err {
            WasmError::FunctionCall { name, reason } => Self::Call { name, reason },
            WasmError::Io(e) => Self::Io(e),
            other => Self::Instantiation(other.to_string()),
        }
    }
}

/// Result type for WASM runtime operations.
pub type WasmResult<T> = Result<T, WasmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_call_maps_to_bundle_call() {
        let err = WasmError::FunctionCall {
            name: "init".to_string(),
            reason: "trap".to_string(),
        };
        let bundle: BundleError = err.into();
        assert!(matches!(bundle, BundleError::Call { .. }));
    }

    #[test]
    fn test_load_maps_to_instantiation() {
        let err = WasmError::ComponentLoad {
            path: "/x/plugin.wasm".to_string(),
            reason: "bad magic".to_string(),
        };
        let bundle: BundleError = err.into();
        assert!(matches!(bundle, BundleError::Instantiation(_)));
    }
}
