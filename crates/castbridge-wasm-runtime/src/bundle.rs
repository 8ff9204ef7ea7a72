//! Instantiated bundle components.
//!
//! The host links four import functions into every bundle. Each one
//! decodes a JSON payload and appends it to the store state; the state
//! is drained into the caller's sink after the guest call returns, so a
//! trapped call leaves nothing behind.

use serde::de::DeserializeOwned;
use wasmtime::component::{Component, Linker, TypedFunc};
use wasmtime::{Engine, Store, StoreContextMut};

use castbridge_capability::{
    BundleError, BundleInstance, BundleResult, ExtractionSink, ExtractorCapability,
    ProviderCapability, RegistrationSink, StreamLink, SubtitleTrack,
};

use crate::{WasmError, WasmResult};

/// Store state accumulating everything a bundle pushes through its
/// imported sink functions.
#[derive(Default)]
pub struct BundleState {
    providers: Vec<ProviderCapability>,
    extractors: Vec<ExtractorCapability>,
    links: Vec<StreamLink>,
    subtitles: Vec<SubtitleTrack>,
}

/// One instantiated bundle component.
pub struct WasmBundle {
    store: Store<BundleState>,
    init: TypedFunc<(), ()>,
    extract: Option<TypedFunc<(String, String, Option<String>), (bool,)>>,
}

impl WasmBundle {
    /// Instantiates a compiled bundle component.
    ///
    /// # Errors
    ///
    /// Returns an error if the component cannot be instantiated against
    /// the sink imports, or does not export `init`.
    pub fn instantiate(engine: &Engine, component: &Component) -> WasmResult<Self> {
        let mut linker: Linker<BundleState> = Linker::new(engine);
        add_sink_imports(&mut linker)?;

        let mut store = Store::new(engine, BundleState::default());
        let instance = linker
            .instantiate(&mut store, component)
            .map_err(|e| WasmError::Instantiation(e.to_string()))?;

        let init = instance
            .get_typed_func::<(), ()>(&mut store, "init")
            .map_err(|e| WasmError::Instantiation(format!("missing 'init' export: {e}")))?;

        // `extract` is optional; provider-only bundles don't export it.
        let extract = instance
            .get_typed_func::<(String, String, Option<String>), (bool,)>(&mut store, "extract")
            .ok();

        Ok(Self {
            store,
            init,
            extract,
        })
    }
}

impl BundleInstance for WasmBundle {
    fn init(&mut self, sink: &mut RegistrationSink) -> BundleResult<()> {
        self.init
            .call(&mut self.store, ())
            .and_then(|()| self.init.post_return(&mut self.store))
            .map_err(|e| BundleError::Registration(e.to_string()))?;

        let state = self.store.data_mut();
        for provider in state.providers.drain(..) {
            sink.push_provider(provider);
        }
        for extractor in state.extractors.drain(..) {
            sink.push_extractor(extractor);
        }

        Ok(())
    }

    fn extract(
        &mut self,
        extractor: &str,
        url: &str,
        referer: Option<&str>,
        sink: &mut ExtractionSink,
    ) -> BundleResult<bool> {
        let Some(func) = &self.extract else {
            tracing::debug!("bundle exports no 'extract' function");
            return Ok(false);
        };

        // Drop leftovers from a previous failed call.
        let state = self.store.data_mut();
        state.links.clear();
        state.subtitles.clear();

        let args = (
            extractor.to_string(),
            url.to_string(),
            referer.map(ToString::to_string),
        );
        let (matched,) = func
            .call(&mut self.store, args)
            .and_then(|result| {
                func.post_return(&mut self.store)?;
                Ok(result)
            })
            .map_err(|e| WasmError::FunctionCall {
                name: "extract".to_string(),
                reason: e.to_string(),
            })
            .map_err(BundleError::from)?;

        let state = self.store.data_mut();
        for link in state.links.drain(..) {
            sink.push_link(link);
        }
        for subtitle in state.subtitles.drain(..) {
            sink.push_subtitle(subtitle);
        }

        Ok(matched)
    }
}

/// Links the host sink functions every bundle imports.
fn add_sink_imports(linker: &mut Linker<BundleState>) -> WasmResult<()> {
    let mut root = linker.root();

    root.func_wrap(
        "register-provider",
        |mut store: StoreContextMut<'_, BundleState>, (payload,): (String,)| {
            let provider = decode::<ProviderCapability>("provider", &payload)?;
            tracing::debug!(name = %provider.name, "bundle registered provider");
            store.data_mut().providers.push(provider);
            Ok(())
        },
    )
    .map_err(|e| WasmError::Instantiation(e.to_string()))?;

    root.func_wrap(
        "register-extractor",
        |mut store: StoreContextMut<'_, BundleState>, (payload,): (String,)| {
            let extractor = decode::<ExtractorCapability>("extractor", &payload)?;
            tracing::debug!(name = %extractor.name, "bundle registered extractor");
            store.data_mut().extractors.push(extractor);
            Ok(())
        },
    )
    .map_err(|e| WasmError::Instantiation(e.to_string()))?;

    root.func_wrap(
        "emit-link",
        |mut store: StoreContextMut<'_, BundleState>, (payload,): (String,)| {
            let link = decode::<StreamLink>("stream link", &payload)?;
            store.data_mut().links.push(link);
            Ok(())
        },
    )
    .map_err(|e| WasmError::Instantiation(e.to_string()))?;

    root.func_wrap(
        "emit-subtitle",
        |mut store: StoreContextMut<'_, BundleState>, (payload,): (String,)| {
            let subtitle = decode::<SubtitleTrack>("subtitle", &payload)?;
            store.data_mut().subtitles.push(subtitle);
            Ok(())
        },
    )
    .map_err(|e| WasmError::Instantiation(e.to_string()))?;

    Ok(())
}

/// Decodes a JSON sink payload; a malformed payload traps the guest
/// call, failing the surrounding load or extraction.
fn decode<T: DeserializeOwned>(kind: &'static str, payload: &str) -> wasmtime::Result<T> {
    serde_json::from_str(payload)
        .map_err(|e| wasmtime::Error::msg(format!("malformed {kind} payload: {e}")))
}
