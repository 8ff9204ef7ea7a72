//! Disable a plugin without removing it.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;

use castbridge_registry::{PluginStatus, PluginStore};

/// Arguments for the `disable` command.
#[derive(Debug, Args)]
pub struct DisableArgs {
    /// Plugin name
    pub name: String,
}

/// Runs the `disable` command.
pub fn run(args: DisableArgs, base_dir: Option<PathBuf>) -> Result<()> {
    let storage = super::open_storage(base_dir)?;
    let store = PluginStore::new(&storage);

    let Some(mut metadata) = store.get(&args.name) else {
        bail!("plugin {} is not installed", args.name);
    };

    if metadata.status == PluginStatus::Disabled {
        println!("Plugin {} is already disabled", args.name);
        return Ok(());
    }

    metadata.status = PluginStatus::Disabled;
    store
        .upsert(metadata)
        .with_context(|| format!("failed to disable {}", args.name))?;

    println!("Disabled {}", args.name);
    Ok(())
}
