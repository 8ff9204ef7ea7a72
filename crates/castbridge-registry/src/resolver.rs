//! Resolving stream URLs to the extractors that can handle them.

use std::sync::Arc;

use serde::Serialize;

use castbridge_capability::ExtractionResult;

use crate::registry::{CapabilityRegistry, RegisteredExtractor};

/// Flat description of one registered extractor, for listing surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractorInfo {
    pub name: String,
    pub base_host: String,
    pub requires_referer: bool,
    pub owner: String,
}

/// Matches URLs and extractor names against the registry's extractor
/// set and drives the owning plugins to produce stream links.
pub struct ExtractorResolver {
    registry: Arc<CapabilityRegistry>,
}

impl ExtractorResolver {
    /// Creates a resolver over the given registry.
    #[must_use]
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    /// Finds an extractor by name, case-insensitively.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<RegisteredExtractor> {
        self.registry
            .extractors()
            .iter()
            .find(|r| r.capability.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Finds every extractor whose base host occurs in `url`, in
    /// registration order.
    ///
    /// Hosts and URLs are compared scheme-insensitively: both sides are
    /// lowercased and stripped of their scheme prefix and trailing
    /// slashes before the substring test. Extractors with an empty base
    /// host never match.
    #[must_use]
    pub fn find_for_url(&self, url: &str) -> Vec<RegisteredExtractor> {
        let needle_url = normalize(url);
        if needle_url.is_empty() {
            return Vec::new();
        }

        self.registry
            .extractors()
            .iter()
            .filter(|r| {
                let host = normalize(&r.capability.base_host);
                !host.is_empty() && needle_url.contains(&host)
            })
            .cloned()
            .collect()
    }

    /// Runs every extractor matching `url` and aggregates their output.
    ///
    /// The result is successful when at least one matching extractor
    /// ran without error, even if it produced no links. Individual
    /// extractor failures are logged and do not abort the remaining
    /// matches.
    #[must_use]
    pub fn extract(&self, url: &str, referer: Option<&str>) -> ExtractionResult {
        let matches = self.find_for_url(url);
        if matches.is_empty() {
            tracing::debug!("no extractor matches url: {url}");
            return ExtractionResult::no_match();
        }

        let mut links = Vec::new();
        let mut subtitles = Vec::new();
        let mut ran_any = false;
        let mut last_error = None;

        for registered in matches {
            let name = &registered.capability.name;
            match registered.plugin.run_extractor(name, url, referer) {
                Ok((handled, mut extractor_links, mut extractor_subtitles)) => {
                    ran_any = true;
                    if handled {
                        tracing::debug!(
                            "extractor {name} produced {} links for {url}",
                            extractor_links.len()
                        );
                    }
                    links.append(&mut extractor_links);
                    subtitles.append(&mut extractor_subtitles);
                }
                Err(e) => {
                    tracing::warn!("extractor {name} failed for {url}: {e}");
                    last_error = Some(e.to_string());
                }
            }
        }

        if ran_any {
            ExtractionResult {
                success: true,
                links,
                subtitles,
                error: None,
            }
        } else {
            ExtractionResult::failure(
                last_error.unwrap_or_else(|| "all matching extractors failed".to_string()),
            )
        }
    }

    /// Runs one named extractor against `url`.
    ///
    /// Unlike [`extract`](Self::extract), the result is successful only
    /// when the extractor actually produced links.
    #[must_use]
    pub fn extract_with(&self, name: &str, url: &str, referer: Option<&str>) -> ExtractionResult {
        let Some(registered) = self.find_by_name(name) else {
            return ExtractionResult::failure(format!("extractor not found: {name}"));
        };

        match registered
            .plugin
            .run_extractor(&registered.capability.name, url, referer)
        {
            Ok((_, links, subtitles)) if !links.is_empty() => ExtractionResult {
                success: true,
                links,
                subtitles,
                error: None,
            },
            Ok(_) => ExtractionResult::failure(format!("extractor {name} produced no links")),
            Err(e) => {
                tracing::warn!("extractor {name} failed for {url}: {e}");
                ExtractionResult::failure(e.to_string())
            }
        }
    }

    /// Lists every registered extractor in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<ExtractorInfo> {
        self.registry
            .extractors()
            .iter()
            .map(|r| ExtractorInfo {
                name: r.capability.name.clone(),
                base_host: r.capability.base_host.clone(),
                requires_referer: r.capability.requires_referer,
                owner: r.capability.owner.clone(),
            })
            .collect()
    }
}

fn normalize(input: &str) -> String {
    let trimmed = input.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    without_scheme.trim_end_matches('/').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{test_registry, write_bundle};
    use tempfile::TempDir;

    const EXTRACTOR_BUNDLE: &str = r#"{
        "extractors": [
            {"name": "VidCloud", "base_host": "https://vidcloud.example"},
            {"name": "StreamTape", "base_host": "streamtape.example/"}
        ],
        "links": [{
            "source": "VidCloud",
            "name": "VidCloud 1080p",
            "url": "https://cdn.vidcloud.example/v/1.m3u8",
            "quality": 1080,
            "is_m3u8": true
        }],
        "subtitles": [{"language": "en", "url": "https://cdn.vidcloud.example/v/1.vtt"}]
    }"#;

    fn seeded_resolver(temp: &TempDir, bundle_json: &str) -> ExtractorResolver {
        let (registry, _runtime) = test_registry(temp.path().join("base"));
        let bundle = temp.path().join("bundle");
        write_bundle(&bundle, bundle_json);
        assert!(registry.load_and_register(&bundle, "streams"));
        ExtractorResolver::new(registry)
    }

    #[test]
    fn test_find_by_name_is_case_insensitive() {
        let temp = TempDir::new().unwrap();
        let resolver = seeded_resolver(&temp, EXTRACTOR_BUNDLE);

        assert!(resolver.find_by_name("vidcloud").is_some());
        assert!(resolver.find_by_name("VIDCLOUD").is_some());
        assert!(resolver.find_by_name("nosuch").is_none());
    }

    #[test]
    fn test_find_for_url_matches_scheme_insensitively() {
        let temp = TempDir::new().unwrap();
        let resolver = seeded_resolver(&temp, EXTRACTOR_BUNDLE);

        let matches = resolver.find_for_url("http://vidcloud.example/embed/abc");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].capability.name, "VidCloud");

        // Host declared with a trailing slash still matches.
        let matches = resolver.find_for_url("https://streamtape.example/v/xyz");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].capability.name, "StreamTape");

        assert!(resolver.find_for_url("https://other.example/v").is_empty());
        assert!(resolver.find_for_url("").is_empty());
    }

    #[test]
    fn test_empty_base_host_never_matches() {
        let temp = TempDir::new().unwrap();
        let resolver = seeded_resolver(
            &temp,
            r#"{"extractors": [{"name": "Broken", "base_host": ""}]}"#,
        );

        assert!(resolver.find_for_url("https://anything.example/v").is_empty());
    }

    #[test]
    fn test_extract_aggregates_matching_extractors() {
        let temp = TempDir::new().unwrap();
        let resolver = seeded_resolver(&temp, EXTRACTOR_BUNDLE);

        let result = resolver.extract("https://vidcloud.example/embed/abc", None);
        assert!(result.success);
        assert_eq!(result.links.len(), 1);
        assert_eq!(result.links[0].quality, 1080);
        assert_eq!(result.subtitles.len(), 1);
    }

    #[test]
    fn test_extract_with_no_match_is_unsuccessful_without_error() {
        let temp = TempDir::new().unwrap();
        let resolver = seeded_resolver(&temp, EXTRACTOR_BUNDLE);

        let result = resolver.extract("https://unknown.example/v", None);
        assert!(!result.success);
        assert!(result.error.is_none());
        assert!(result.links.is_empty());
    }

    #[test]
    fn test_extract_reports_failure_when_all_matches_error() {
        let temp = TempDir::new().unwrap();
        let resolver = seeded_resolver(
            &temp,
            r#"{
                "extractors": [{"name": "Flaky", "base_host": "flaky.example"}],
                "fail_extract": true
            }"#,
        );

        let result = resolver.extract("https://flaky.example/v", None);
        assert!(!result.success);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_extract_with_named_extractor() {
        let temp = TempDir::new().unwrap();
        let resolver = seeded_resolver(&temp, EXTRACTOR_BUNDLE);

        let result = resolver.extract_with("vidcloud", "https://vidcloud.example/embed/abc", None);
        assert!(result.success);
        assert_eq!(result.links.len(), 1);

        let result = resolver.extract_with("nosuch", "https://vidcloud.example/v", None);
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("extractor not found: nosuch"));
    }

    #[test]
    fn test_extract_with_requires_links() {
        let temp = TempDir::new().unwrap();
        // StreamTape matches by name but the fake bundle only emits
        // links for VidCloud, so the dedicated call comes back empty.
        let resolver = seeded_resolver(&temp, EXTRACTOR_BUNDLE);

        let result =
            resolver.extract_with("StreamTape", "https://streamtape.example/v/xyz", None);
        assert!(!result.success);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_list_reports_every_registered_extractor() {
        let temp = TempDir::new().unwrap();
        let resolver = seeded_resolver(&temp, EXTRACTOR_BUNDLE);

        let infos = resolver.list();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].name, "VidCloud");
        assert_eq!(infos[0].owner, "streams");
        assert!(!infos[1].requires_referer);
    }
}
