//! List installed plugins.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use castbridge_registry::{PluginStatus, PluginStore};

/// Arguments for the `list` command.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only show enabled plugins
    #[arg(long)]
    pub enabled: bool,
}

/// Runs the `list` command.
pub fn run(args: ListArgs, base_dir: Option<PathBuf>) -> Result<()> {
    let storage = super::open_storage(base_dir)?;
    let store = PluginStore::new(&storage);

    let mut plugins = store.list();
    plugins.retain(|p| !args.enabled || p.status == PluginStatus::Installed);
    plugins.sort_by(|a, b| a.internal_name.cmp(&b.internal_name));

    if plugins.is_empty() {
        println!("No plugins installed.");
        return Ok(());
    }

    println!("Installed plugins:");
    for plugin in plugins {
        let status = match plugin.status {
            PluginStatus::Installed => "enabled",
            PluginStatus::Disabled => "disabled",
        };
        let path = plugin
            .local_path
            .as_ref()
            .map_or_else(|| "<no bundle>".to_string(), |p| p.display().to_string());
        println!("  {} [{status}] {path}", plugin.internal_name);
    }
    Ok(())
}
