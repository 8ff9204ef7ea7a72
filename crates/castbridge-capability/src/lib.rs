//! Capability model and bundle ABI for Castbridge.
//!
//! This crate defines what a plugin bundle can contribute to the host:
//! - [`ProviderCapability`]: a browse/search/detail content source
//! - [`ExtractorCapability`]: resolves playable streams for a URL
//!
//! plus the narrow interface every bundle runtime implements:
//! - [`BundleRuntime`]: instantiates a compiled bundle artifact
//! - [`BundleInstance`]: one live instance, driven through explicit sinks
//!
//! Bundles never touch shared host state directly. During initialization
//! they push capabilities onto a [`RegistrationSink`]; during extraction
//! they push results onto an [`ExtractionSink`]. The contents of the sink
//! after the call is exactly what the bundle contributed.

mod capability;
mod error;
mod manifest;
mod runtime;
mod sink;
mod stream;

pub use capability::{ExtractorCapability, MainPageDescriptor, ProviderCapability};
pub use error::{BundleError, BundleResult};
pub use manifest::BundleManifest;
pub use runtime::{BundleInstance, BundleRuntime};
pub use sink::{ExtractionSink, RegistrationSink};
pub use stream::{ExtractionResult, StreamLink, SubtitleTrack};
