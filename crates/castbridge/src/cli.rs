//! CLI definition.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Manage and drive capability plugin bundles.
#[derive(Debug, Parser)]
#[command(name = "castbridge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Base directory for bundles and plugin metadata
    #[arg(long, global = true, env = "CASTBRIDGE_BASE_DIR")]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Register an extracted bundle directory as an installed plugin
    Add(commands::add::AddArgs),

    /// Remove an installed plugin and its staged artifacts
    Remove(commands::remove::RemoveArgs),

    /// List installed plugins
    List(commands::list::ListArgs),

    /// Enable a disabled plugin
    Enable(commands::enable::EnableArgs),

    /// Disable a plugin without removing it
    Disable(commands::disable::DisableArgs),

    /// Load a bundle and register its capabilities
    Load(commands::load::LoadArgs),

    /// Unload a plugin and clean up its staged artifacts
    Unload(commands::unload::UnloadArgs),

    /// Reload every installed plugin from the persisted store
    Reload(commands::reload::ReloadArgs),

    /// Validate a bundle directory by loading it end to end
    Check(commands::check::CheckArgs),

    /// List provider capabilities registered by installed plugins
    Providers(commands::providers::ProvidersArgs),

    /// List extractors registered by installed plugins
    Extractors(commands::extractors::ExtractorsArgs),

    /// Resolve a stream URL through the registered extractors
    Extract(commands::extract::ExtractArgs),
}

impl Cli {
    /// Runs the CLI command.
    pub fn run(self) -> Result<()> {
        let base_dir = self.base_dir;
        match self.command {
            Commands::Add(args) => commands::add::run(args, base_dir),
            Commands::Remove(args) => commands::remove::run(args, base_dir),
            Commands::List(args) => commands::list::run(args, base_dir),
            Commands::Enable(args) => commands::enable::run(args, base_dir),
            Commands::Disable(args) => commands::disable::run(args, base_dir),
            Commands::Load(args) => commands::load::run(args, base_dir),
            Commands::Unload(args) => commands::unload::run(args, base_dir),
            Commands::Reload(args) => commands::reload::run(args, base_dir),
            Commands::Check(args) => commands::check::run(args, base_dir),
            Commands::Providers(args) => commands::providers::run(args, base_dir),
            Commands::Extractors(args) => commands::extractors::run(args, base_dir),
            Commands::Extract(args) => commands::extract::run(args, base_dir),
        }
    }
}
