//! Resolve a stream URL through the registered extractors.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use castbridge_registry::ExtractorResolver;

/// Arguments for the `extract` command.
#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Stream page or embed URL
    pub url: String,

    /// Referer header value for the extraction
    #[arg(short, long)]
    pub referer: Option<String>,

    /// Run only this extractor instead of matching by URL
    #[arg(short, long)]
    pub extractor: Option<String>,

    /// Emit machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Runs the `extract` command.
pub fn run(args: ExtractArgs, base_dir: Option<PathBuf>) -> Result<()> {
    let registry = super::open_registry(base_dir)?;
    registry.initialize();

    let resolver = ExtractorResolver::new(registry);
    let referer = args.referer.as_deref();
    let result = match &args.extractor {
        Some(name) => resolver.extract_with(name, &args.url, referer),
        None => resolver.extract(&args.url, referer),
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("failed to encode extraction result")?
        );
        return Ok(());
    }

    if result.success {
        println!("Found {} links", result.links.len());
        for link in &result.links {
            let kind = if link.is_m3u8 {
                "m3u8"
            } else if link.is_dash {
                "dash"
            } else {
                "file"
            };
            println!("  [{}] {} ({kind}) {}", link.quality, link.name, link.url);
        }
        for subtitle in &result.subtitles {
            println!("  subtitle [{}] {}", subtitle.language, subtitle.url);
        }
        Ok(())
    } else if let Some(error) = &result.error {
        anyhow::bail!("extraction failed: {error}");
    } else {
        anyhow::bail!("no extractor matched {}", args.url);
    }
}
