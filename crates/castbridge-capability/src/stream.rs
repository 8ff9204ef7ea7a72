//! Extraction result types surfaced by extractors.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A playable stream link surfaced by an extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamLink {
    /// Name of the source that produced the link.
    pub source: String,
    /// Human-readable label (e.g. "VidCloud 1080p").
    pub name: String,
    /// Direct stream URL.
    pub url: String,
    /// Referer required to play the stream, empty if none.
    #[serde(default)]
    pub referer: String,
    /// Vertical resolution, 0 when unknown.
    #[serde(default)]
    pub quality: u32,
    /// Extra request headers the player must send.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Whether the link is an HLS playlist.
    #[serde(default)]
    pub is_m3u8: bool,
    /// Whether the link is a DASH manifest.
    #[serde(default)]
    pub is_dash: bool,
}

/// A subtitle track surfaced alongside stream links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    /// Subtitle language label.
    pub language: String,
    /// Subtitle file URL.
    pub url: String,
}

/// Outcome of an extraction attempt.
///
/// Extraction failures are data, not errors: a missing extractor or a
/// failed resolution comes back as `success: false` with everything the
/// attempt did surface, and never crosses the boundary as a panic or a
/// `Result::Err`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Whether extraction succeeded.
    pub success: bool,
    /// Stream links surfaced, in emission order.
    pub links: Vec<StreamLink>,
    /// Subtitle tracks surfaced, in emission order.
    pub subtitles: Vec<SubtitleTrack>,
    /// Failure description when `success` is false and a cause is known.
    pub error: Option<String>,
}

impl ExtractionResult {
    /// An empty negative result with no recorded cause.
    #[must_use]
    pub fn no_match() -> Self {
        Self::default()
    }

    /// A negative result carrying a failure description.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}
