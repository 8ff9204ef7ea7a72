//! In-memory bundle runtime for tests.
//!
//! A fake "artifact" is a JSON file describing what the bundle would do:
//! which capabilities its entry point registers, whether registration
//! fails partway, and which links its extractors surface.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Deserialize;

use castbridge_capability::{
    BundleError, BundleInstance, BundleResult, BundleRuntime, ExtractionSink,
    ExtractorCapability, ProviderCapability, RegistrationSink, StreamLink, SubtitleTrack,
};

use crate::registry::CapabilityRegistry;
use crate::storage::BridgeStorage;
use crate::store::PluginStore;

/// What a fake bundle does when driven.
#[derive(Debug, Default, Clone, Deserialize)]
pub(crate) struct FakeBundleSpec {
    #[serde(default)]
    pub providers: Vec<ProviderCapability>,
    #[serde(default)]
    pub extractors: Vec<ExtractorCapability>,
    /// Registration pushes everything above, then fails.
    #[serde(default)]
    pub fail_init: bool,
    /// Links every successful extraction surfaces.
    #[serde(default)]
    pub links: Vec<StreamLink>,
    #[serde(default)]
    pub subtitles: Vec<SubtitleTrack>,
    /// Extraction calls fail outright.
    #[serde(default)]
    pub fail_extract: bool,
}

/// Fake [`BundleRuntime`] reading [`FakeBundleSpec`] artifacts.
#[derive(Default)]
pub(crate) struct FakeRuntime {
    init_calls: Arc<AtomicUsize>,
}

impl FakeRuntime {
    /// Total registration-routine invocations across all instances.
    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }
}

impl BundleRuntime for FakeRuntime {
    fn instantiate(&self, artifact: &Path) -> BundleResult<Box<dyn BundleInstance>> {
        let raw = std::fs::read_to_string(artifact)
            .map_err(|e| BundleError::Instantiation(e.to_string()))?;
        let spec: FakeBundleSpec =
            serde_json::from_str(&raw).map_err(|e| BundleError::Instantiation(e.to_string()))?;

        Ok(Box::new(FakeInstance {
            spec,
            init_calls: Arc::clone(&self.init_calls),
        }))
    }
}

struct FakeInstance {
    spec: FakeBundleSpec,
    init_calls: Arc<AtomicUsize>,
}

impl BundleInstance for FakeInstance {
    fn init(&mut self, sink: &mut RegistrationSink) -> BundleResult<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);

        for provider in self.spec.providers.clone() {
            sink.push_provider(provider);
        }
        for extractor in self.spec.extractors.clone() {
            sink.push_extractor(extractor);
        }

        if self.spec.fail_init {
            return Err(BundleError::Registration(
                "entry point failed partway through".to_string(),
            ));
        }
        Ok(())
    }

    fn extract(
        &mut self,
        extractor: &str,
        _url: &str,
        _referer: Option<&str>,
        sink: &mut ExtractionSink,
    ) -> BundleResult<bool> {
        if self.spec.fail_extract {
            return Err(BundleError::Call {
                name: "extract".to_string(),
                reason: "simulated transport failure".to_string(),
            });
        }

        let known = self
            .spec
            .extractors
            .iter()
            .any(|e| e.name.eq_ignore_ascii_case(extractor));
        if !known {
            return Ok(false);
        }

        // Links carry their originating extractor in `source`; only
        // those belonging to the driven extractor surface.
        let mut emitted = false;
        for link in &self.spec.links {
            if link.source.is_empty() || link.source.eq_ignore_ascii_case(extractor) {
                sink.push_link(link.clone());
                emitted = true;
            }
        }
        if emitted {
            for subtitle in self.spec.subtitles.clone() {
                sink.push_subtitle(subtitle);
            }
        }
        Ok(true)
    }
}

/// Writes a fake bundle directory (manifest + spec artifact).
pub(crate) fn write_bundle(dir: &Path, spec_json: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(
        dir.join("manifest.json"),
        r#"{"entryPoint": "plugin.wasm"}"#,
    )
    .unwrap();
    std::fs::write(dir.join("plugin.wasm"), spec_json).unwrap();
}

/// Builds a registry over a fake runtime rooted in `base_dir`.
pub(crate) fn test_registry(base_dir: PathBuf) -> (Arc<CapabilityRegistry>, Arc<FakeRuntime>) {
    let runtime = Arc::new(FakeRuntime::default());
    let storage = Arc::new(BridgeStorage::with_base_dir(base_dir).unwrap());
    let store = PluginStore::new(&storage);
    let registry = Arc::new(CapabilityRegistry::new(
        Arc::clone(&runtime) as Arc<dyn BundleRuntime>,
        storage,
        store,
    ));
    (registry, runtime)
}
