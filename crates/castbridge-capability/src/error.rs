//! Bundle-level error types.

use thiserror::Error;

/// Errors raised while instantiating or driving a bundle.
#[derive(Debug, Error)]
pub enum BundleError {
    /// Manifest missing or malformed.
    #[error("malformed bundle manifest: {reason}")]
    Manifest { reason: String },

    /// Bundle artifact could not be instantiated.
    #[error("failed to instantiate bundle: {0}")]
    Instantiation(String),

    /// The entry point's registration routine failed.
    #[error("bundle registration failed: {0}")]
    Registration(String),

    /// A call into a bundle instance failed.
    #[error("bundle call '{name}' failed: {reason}")]
    Call { name: String, reason: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for bundle operations.
pub type BundleResult<T> = Result<T, BundleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_display() {
        let err = BundleError::Registration("trap in init".to_string());
        assert_eq!(err.to_string(), "bundle registration failed: trap in init");
    }

    #[test]
    fn test_call_display() {
        let err = BundleError::Call {
            name: "extract".to_string(),
            reason: "trap".to_string(),
        };
        assert_eq!(err.to_string(), "bundle call 'extract' failed: trap");
    }
}
