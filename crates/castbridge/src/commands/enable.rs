//! Enable a disabled plugin.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;

use castbridge_registry::{PluginStatus, PluginStore};

/// Arguments for the `enable` command.
#[derive(Debug, Args)]
pub struct EnableArgs {
    /// Plugin name
    pub name: String,
}

/// Runs the `enable` command.
pub fn run(args: EnableArgs, base_dir: Option<PathBuf>) -> Result<()> {
    let storage = super::open_storage(base_dir)?;
    let store = PluginStore::new(&storage);

    let Some(mut metadata) = store.get(&args.name) else {
        bail!("plugin {} is not installed", args.name);
    };

    if metadata.status == PluginStatus::Installed {
        println!("Plugin {} is already enabled", args.name);
        return Ok(());
    }

    metadata.status = PluginStatus::Installed;
    store
        .upsert(metadata)
        .with_context(|| format!("failed to enable {}", args.name))?;

    println!("Enabled {}", args.name);
    Ok(())
}
