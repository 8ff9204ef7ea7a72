//! Capability types contributed by plugin bundles.

use serde::{Deserialize, Serialize};

/// One row on a provider's landing page (e.g. "Trending", "Latest").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainPageDescriptor {
    /// Display name of the row.
    pub name: String,
    /// Opaque request data the provider uses to fetch the row.
    pub data: String,
    /// Whether the row renders horizontal (landscape) artwork.
    #[serde(default)]
    pub horizontal_images: bool,
}

/// A content-provider capability: one source offering browse, search,
/// detail, and video-list operations.
///
/// Providers are metadata here; per-operation dispatch lives in the
/// calling layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCapability {
    /// Display name, unique within the registry.
    pub name: String,
    /// Base URL of the content source.
    pub base_url: String,
    /// Primary language of the source (ISO 639-1).
    #[serde(default)]
    pub language: Option<String>,
    /// Content categories this source serves (e.g. "movie", "anime").
    #[serde(default)]
    pub content_types: Vec<String>,
    /// Landing-page rows the source exposes.
    #[serde(default)]
    pub main_pages: Vec<MainPageDescriptor>,
}

/// A stream-extractor capability: given a URL on its host, resolves
/// playable stream links and subtitle tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorCapability {
    /// Extractor name, matched case-insensitively at lookup.
    pub name: String,
    /// Host this extractor handles, with or without a scheme prefix.
    pub base_host: String,
    /// Whether the extractor needs a referer header to resolve links.
    #[serde(default)]
    pub requires_referer: bool,
    /// Internal name of the plugin that contributed this extractor.
    ///
    /// Stamped by the loader after registration; bundles leave it empty.
    #[serde(default)]
    pub owner: String,
}
