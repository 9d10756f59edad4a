//! `cuco bundle`: registry bundle listing.
//!
//! Bundles that have an install record in one of the project's engine
//! folders are marked with the engine they were installed into.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use std::collections::BTreeMap;
use std::path::Path;

use super::CommandContext;
use crate::lockfile::list_records;
use crate::manifest::list_bundles;
use crate::target::{DetectedTarget, TargetEngine};

/// Inspect bundles in the registry.
#[derive(Args)]
pub struct BundleCommand {
    #[command(subcommand)]
    command: BundleSubcommand,
}

#[derive(Subcommand)]
enum BundleSubcommand {
    /// List bundles available in the registry.
    List,
}

impl BundleCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        match self.command {
            BundleSubcommand::List => {
                let config = ctx.load_config().await?;
                let bundles = list_bundles(config.registry_dir())?;
                if bundles.is_empty() {
                    println!("No bundles in {}", config.registry_dir().display());
                    return Ok(());
                }
                let installed = installed_bundles(ctx.project_root())?;
                for bundle in bundles {
                    let manifest = bundle.manifest;
                    let marker = installed
                        .get(&manifest.name)
                        .map(|(engine, version)| {
                            format!(" [installed: {engine} {version}]").green().to_string()
                        })
                        .unwrap_or_default();
                    println!(
                        "{} {} ({} resources){}{}",
                        manifest.name.bold(),
                        manifest.version.dimmed(),
                        manifest.resource_count(),
                        marker,
                        manifest.description.map(|d| format!("\n    {d}")).unwrap_or_default()
                    );
                }
                Ok(())
            }
        }
    }
}

/// Installed bundle names with the first engine, in priority order, that records them.
fn installed_bundles(project_root: &Path) -> Result<BTreeMap<String, (TargetEngine, String)>> {
    let mut installed = BTreeMap::new();
    for engine in TargetEngine::PRIORITY {
        let target = DetectedTarget::for_engine(project_root, engine);
        if !target.exists {
            continue;
        }
        for record in list_records(&target.root)? {
            installed.entry(record.bundle).or_insert((engine, record.bundle_version));
        }
    }
    Ok(installed)
}
