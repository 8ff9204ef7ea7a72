//! List provider capabilities registered by installed plugins.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

/// Arguments for the `providers` command.
#[derive(Debug, Args)]
pub struct ProvidersArgs {
    /// Only show providers from this plugin
    #[arg(short, long)]
    pub plugin: Option<String>,

    /// Emit machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Runs the `providers` command.
pub fn run(args: ProvidersArgs, base_dir: Option<PathBuf>) -> Result<()> {
    let registry = super::open_registry(base_dir)?;
    registry.initialize();

    let mut plugins = registry.plugins();
    plugins.retain(|p| {
        args.plugin
            .as_ref()
            .is_none_or(|name| p.internal_name().eq_ignore_ascii_case(name))
    });
    plugins.sort_by(|a, b| a.internal_name().cmp(b.internal_name()));

    if args.json {
        let providers: Vec<_> = plugins
            .iter()
            .flat_map(|p| p.providers().iter().map(|c| c.as_ref().clone()))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&providers).context("failed to encode providers")?
        );
        return Ok(());
    }

    if plugins.iter().all(|p| p.providers().is_empty()) {
        println!("No providers registered.");
        return Ok(());
    }

    for plugin in plugins {
        if plugin.providers().is_empty() {
            continue;
        }
        println!("{}:", plugin.internal_name());
        for provider in plugin.providers() {
            let language = provider.language.as_deref().unwrap_or("-");
            println!("  {} {} [{language}]", provider.name, provider.base_url);
        }
    }
    Ok(())
}
