//! Remove an installed plugin.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use castbridge_registry::PluginStore;

/// Arguments for the `remove` command.
#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Plugin name
    pub name: String,
}

/// Runs the `remove` command.
pub fn run(args: RemoveArgs, base_dir: Option<PathBuf>) -> Result<()> {
    let storage = super::open_storage(base_dir)?;
    let store = PluginStore::new(&storage);

    let removed = store
        .remove(&args.name)
        .with_context(|| format!("failed to remove {}", args.name))?;

    if removed {
        println!("Removed {}", args.name);
    } else {
        println!("Plugin {} is not installed", args.name);
    }
    Ok(())
}
