//! Unload a plugin and clean up its staged artifacts.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

/// Arguments for the `unload` command.
#[derive(Debug, Args)]
pub struct UnloadArgs {
    /// Plugin id
    pub id: String,
}

/// Runs the `unload` command.
///
/// Loads the installed set first so the report reflects whether the
/// plugin was actually resident; either way its staging directory is
/// gone afterwards.
pub fn run(args: UnloadArgs, base_dir: Option<PathBuf>) -> Result<()> {
    let storage = super::open_storage(base_dir.clone())?;
    let registry = super::open_registry(base_dir)?;
    registry.initialize();

    let removed = registry.unload_and_unregister(&args.id);
    if removed {
        println!("Unloaded {}", args.id);
    } else {
        println!("Plugin {} was not loaded", args.id);
    }

    let stage_dir = storage.stage_dir_for(&args.id);
    println!(
        "  staging directory {}",
        if stage_dir.exists() {
            "still present"
        } else {
            "removed"
        }
    );
    Ok(())
}
