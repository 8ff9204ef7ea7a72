//! Explicit sinks bundles report into.
//!
//! A fresh sink is handed to a bundle for each call, so the sink's final
//! contents are exactly what that call contributed. This replaces the
//! "register into a shared global list and diff snapshots" scheme some
//! plugin hosts use, and removes its partial-failure leak: a failed call
//! drops the sink and nothing becomes visible.

use crate::{ExtractorCapability, ProviderCapability, StreamLink, SubtitleTrack};

/// Collects capabilities pushed by a bundle's entry point.
#[derive(Debug, Default)]
pub struct RegistrationSink {
    providers: Vec<ProviderCapability>,
    extractors: Vec<ExtractorCapability>,
}

impl RegistrationSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a provider capability.
    pub fn push_provider(&mut self, provider: ProviderCapability) {
        self.providers.push(provider);
    }

    /// Records an extractor capability.
    pub fn push_extractor(&mut self, extractor: ExtractorCapability) {
        self.extractors.push(extractor);
    }

    /// Number of providers recorded so far.
    #[must_use]
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Number of extractors recorded so far.
    #[must_use]
    pub fn extractor_count(&self) -> usize {
        self.extractors.len()
    }

    /// Returns true if nothing was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty() && self.extractors.is_empty()
    }

    /// Consumes the sink, yielding everything the bundle registered.
    #[must_use]
    pub fn into_parts(self) -> (Vec<ProviderCapability>, Vec<ExtractorCapability>) {
        (self.providers, self.extractors)
    }
}

/// Collects stream links and subtitle tracks emitted during extraction.
#[derive(Debug, Default)]
pub struct ExtractionSink {
    links: Vec<StreamLink>,
    subtitles: Vec<SubtitleTrack>,
}

impl ExtractionSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a surfaced stream link.
    pub fn push_link(&mut self, link: StreamLink) {
        self.links.push(link);
    }

    /// Records a surfaced subtitle track.
    pub fn push_subtitle(&mut self, subtitle: SubtitleTrack) {
        self.subtitles.push(subtitle);
    }

    /// Number of links recorded so far.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Consumes the sink, yielding everything the extractor surfaced.
    #[must_use]
    pub fn into_parts(self) -> (Vec<StreamLink>, Vec<SubtitleTrack>) {
        (self.links, self.subtitles)
    }
}
