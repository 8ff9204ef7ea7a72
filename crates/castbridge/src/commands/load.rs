//! Load a bundle and register everything it contributes.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;

/// Arguments for the `load` command.
#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Path to the extracted bundle directory
    pub dir: PathBuf,

    /// Plugin id to register the bundle under
    pub id: String,
}

/// Runs the `load` command.
pub fn run(args: LoadArgs, base_dir: Option<PathBuf>) -> Result<()> {
    let dir = args
        .dir
        .canonicalize()
        .with_context(|| format!("bundle directory not found: {}", args.dir.display()))?;

    let registry = super::open_registry(base_dir)?;
    if !registry.load_and_register(&dir, &args.id) {
        bail!("failed to load bundle {} as {}", dir.display(), args.id);
    }

    let Some(plugin) = registry.plugin(&args.id) else {
        bail!("plugin {} did not register", args.id);
    };

    println!(
        "Loaded {} with {} providers and {} extractors",
        args.id,
        plugin.providers().len(),
        plugin.extractors().len()
    );
    for provider in plugin.providers() {
        println!("  provider: {} ({})", provider.name, provider.base_url);
    }
    for extractor in plugin.extractors() {
        println!("  extractor: {} ({})", extractor.name, extractor.base_host);
    }
    Ok(())
}
