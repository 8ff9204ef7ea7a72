//! Register an extracted bundle directory as an installed plugin.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;

use castbridge_capability::BundleManifest;
use castbridge_registry::{PluginMetadata, PluginStore};

/// Arguments for the `add` command.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Path to the extracted bundle directory
    pub dir: PathBuf,

    /// Internal name for the plugin (defaults to the manifest name or
    /// the directory name)
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Runs the `add` command.
pub fn run(args: AddArgs, base_dir: Option<PathBuf>) -> Result<()> {
    let dir = args
        .dir
        .canonicalize()
        .with_context(|| format!("bundle directory not found: {}", args.dir.display()))?;
    if !dir.is_dir() {
        bail!("not a directory: {}", dir.display());
    }

    // The root manifest is optional here; the loader searches deeper
    // when the plugin is actually loaded.
    let manifest = BundleManifest::from_file(&dir.join("manifest.json")).unwrap_or_default();

    let internal_name = match args.name.or_else(|| manifest.name.clone()) {
        Some(name) => normalize_name(&name),
        None => dir
            .file_name()
            .map(|n| normalize_name(&n.to_string_lossy()))
            .context("cannot derive a plugin name from the bundle path")?,
    };
    if internal_name.is_empty() {
        bail!("derived plugin name is empty, pass one with --name");
    }

    let mut metadata = PluginMetadata::installed(&internal_name, Some(dir.clone()));
    metadata.language = manifest.language;
    metadata.repo_url = manifest.repository_url;

    let storage = super::open_storage(base_dir)?;
    let store = PluginStore::new(&storage);
    store
        .upsert(metadata)
        .with_context(|| format!("failed to record plugin {internal_name}"))?;

    println!("Added {internal_name} ({})", dir.display());
    println!("Run `castbridge check {}` to validate it.", dir.display());
    Ok(())
}

fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase().replace(char::is_whitespace, "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Example Stream"), "example-stream");
        assert_eq!(normalize_name("  VidCloud  "), "vidcloud");
        assert_eq!(normalize_name(""), "");
    }
}
