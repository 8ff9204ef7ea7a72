//! List extractors registered by installed plugins.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use castbridge_registry::ExtractorResolver;

/// Arguments for the `extractors` command.
#[derive(Debug, Args)]
pub struct ExtractorsArgs {
    /// Emit machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Runs the `extractors` command.
pub fn run(args: ExtractorsArgs, base_dir: Option<PathBuf>) -> Result<()> {
    let registry = super::open_registry(base_dir)?;
    registry.initialize();

    let resolver = ExtractorResolver::new(registry);
    let infos = resolver.list();

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&infos).context("failed to encode extractors")?
        );
        return Ok(());
    }

    if infos.is_empty() {
        println!("No extractors registered.");
        return Ok(());
    }

    println!("Registered extractors:");
    for info in infos {
        let referer = if info.requires_referer {
            " (requires referer)"
        } else {
            ""
        };
        println!(
            "  {} {} from {}{referer}",
            info.name, info.base_host, info.owner
        );
    }
    Ok(())
}
