//! Bundle runtime seam.
//!
//! The registry core drives bundles exclusively through these traits, so
//! the instantiation mechanism stays swappable: production uses the
//! wasmtime-backed runtime, tests use an in-memory fake.

use std::path::Path;

use crate::{BundleResult, ExtractionSink, RegistrationSink};

/// Instantiates compiled bundle artifacts.
pub trait BundleRuntime: Send + Sync {
    /// Instantiates the entry point of a compiled bundle artifact.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BundleError::Instantiation`] when the artifact is
    /// not a loadable bundle.
    fn instantiate(&self, artifact: &Path) -> BundleResult<Box<dyn BundleInstance>>;
}

/// One live bundle instance.
///
/// Calls take `&mut self`; callers serialize access per instance.
pub trait BundleInstance: Send {
    /// Invokes the entry point's registration routine once.
    ///
    /// Everything the bundle contributes lands in `sink`; on error the
    /// sink's contents must be discarded by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BundleError::Registration`] when the routine
    /// fails partway through.
    fn init(&mut self, sink: &mut RegistrationSink) -> BundleResult<()>;

    /// Drives the named extractor against a URL, accumulating surfaced
    /// links and subtitles in `sink`.
    ///
    /// Returns `false` when the bundle does not recognize the extractor
    /// name or the URL; that is a negative result, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BundleError::Call`] when the invocation itself
    /// fails (trap, transport failure inside the bundle).
    fn extract(
        &mut self,
        extractor: &str,
        url: &str,
        referer: Option<&str>,
        sink: &mut ExtractionSink,
    ) -> BundleResult<bool>;
}
