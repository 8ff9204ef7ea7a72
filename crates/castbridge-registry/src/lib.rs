//! Plugin registry for castbridge.
//!
//! This crate owns the full lifecycle of capability bundles: locating
//! them on disk, driving their entry points through a
//! [`BundleRuntime`](castbridge_capability::BundleRuntime), and
//! exposing the capabilities they register for lookup and extraction.
//!
//! The main types are:
//!
//! - [`BundleLoader`] — manifest discovery, artifact staging, and the
//!   commit-or-nothing instantiation of a single bundle
//! - [`CapabilityRegistry`] — the process-scoped capability index
//! - [`CapabilityRouter`] — name-to-capability routing with on-demand
//!   loading
//! - [`ExtractorResolver`] — URL and name matching over the global
//!   extractor set
//! - [`PluginStore`] — persisted installation metadata
//! - [`BridgeStorage`] — on-disk directory layout

pub mod error;
pub mod loader;
pub mod registry;
pub mod resolver;
pub mod router;
pub mod storage;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{RegistryError, RegistryResult};
pub use loader::{BundleLoader, LoadedPlugin};
pub use registry::{CapabilityRegistry, RegisteredExtractor};
pub use resolver::{ExtractorInfo, ExtractorResolver};
pub use router::CapabilityRouter;
pub use storage::BridgeStorage;
pub use store::{PluginMetadata, PluginStatus, PluginStore};
