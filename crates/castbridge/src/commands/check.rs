//! Validate a bundle directory by loading it end to end.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;

use castbridge_capability::BundleRuntime;
use castbridge_registry::{BridgeStorage, BundleLoader};
use castbridge_wasm_runtime::WasmRuntime;

/// Arguments for the `check` command.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Path to the extracted bundle directory
    pub dir: PathBuf,
}

/// Runs the `check` command.
///
/// The bundle is loaded into a throwaway staging area under a temporary
/// plugin id, so a broken bundle never touches the installed set.
pub fn run(args: CheckArgs, base_dir: Option<PathBuf>) -> Result<()> {
    let dir = args
        .dir
        .canonicalize()
        .with_context(|| format!("bundle directory not found: {}", args.dir.display()))?;

    let storage = super::open_storage(base_dir)?;
    let runtime: Arc<dyn BundleRuntime> =
        Arc::new(WasmRuntime::new().context("failed to create wasm runtime")?);
    let loader = BundleLoader::new(runtime, Arc::clone(&storage));

    let probe_id = "check-probe";
    let result = loader.load(&dir, probe_id);
    loader.unload(probe_id);

    let plugin = match result {
        Ok(plugin) => plugin,
        Err(e) => bail!("bundle failed to load: {e}"),
    };

    println!("Bundle OK: {}", dir.display());
    println!("  providers: {}", plugin.providers().len());
    for provider in plugin.providers() {
        println!("    {} ({})", provider.name, provider.base_url);
    }
    println!("  extractors: {}", plugin.extractors().len());
    for extractor in plugin.extractors() {
        println!("    {} ({})", extractor.name, extractor.base_host);
    }
    check_storage(&storage)
}

// A probe load must leave nothing staged behind.
fn check_storage(storage: &BridgeStorage) -> Result<()> {
    let stage = storage.stage_dir_for("check-probe");
    if stage.exists() {
        bail!("staging directory was not cleaned up: {}", stage.display());
    }
    Ok(())
}
