//! Reload every installed plugin from the persisted store.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

/// Arguments for the `reload` command.
#[derive(Debug, Args)]
pub struct ReloadArgs {}

/// Runs the `reload` command.
pub fn run(_args: ReloadArgs, base_dir: Option<PathBuf>) -> Result<()> {
    let registry = super::open_registry(base_dir)?;
    registry.initialize();

    let count = registry.reload_all();
    println!("Reloaded {count} plugins");
    Ok(())
}
