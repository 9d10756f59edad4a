//! `cuco install`: resolve a bundle and materialize it.
//!
//! The target engine is detected from marker folders unless `--engine` is
//! given. A bundle that already has a record in the target is re-synced
//! instead, so local edits are never silently overwritten; `--force` takes
//! upstream for any conflict.
//!
//! ```bash
//! cuco install team-review
//! cuco install ./my-bundle --engine claude
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tracing::info;

use super::CommandContext;
use super::common::{check_sync_failures, print_install_report, print_sync_report};
use crate::config::SourceConfig;
use crate::core::CucoError;
use crate::installer::Materializer;
use crate::manifest::{LoadedBundle, find_bundle};
use crate::resolver::resolve;
use crate::source::SourceManager;
use crate::sync::{self, ConflictDecision, DeferResolver, PolicyResolver, locate_installed};
use crate::target::TargetEngine;

/// Resolve a bundle and materialize it into the target folder.
#[derive(Args)]
pub struct InstallCommand {
    /// Bundle name in the registry, or path to a bundle directory
    bundle: String,

    /// Target engine instead of detection (github, claude, cuco)
    #[arg(long)]
    engine: Option<TargetEngine>,

    /// Overwrite existing files that differ from the bundle
    #[arg(long)]
    force: bool,
}

impl InstallCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let config = ctx.load_config().await?;
        let bundle = find_bundle(&self.bundle, config.registry_dir())?;
        install_bundle(ctx, config, &bundle, self.engine, self.force).await
    }
}

/// Installs a loaded bundle, or re-syncs it when a record already exists.
pub(super) async fn install_bundle(
    ctx: &CommandContext,
    config: SourceConfig,
    bundle: &LoadedBundle,
    engine: Option<TargetEngine>,
    force: bool,
) -> Result<()> {
    let name = bundle.manifest.name.clone();

    let (target, record) = locate_installed(ctx.project_root(), &name, engine)?;
    println!(
        "{} bundle '{}' {} into {}",
        "Installing".cyan().bold(),
        name,
        bundle.manifest.version,
        target.root.display()
    );

    let mut sources = SourceManager::new(config);
    let resolution = resolve(bundle, &mut sources).await?;
    let materializer = Materializer::new(&target);

    if record.is_some() {
        info!("Bundle '{name}' already installed, syncing instead");
        println!("Bundle '{name}' is already installed; syncing");
        let plan = sync::plan(&materializer, &resolution, record)?;
        let report = if force {
            sync::apply(&materializer, plan, &mut PolicyResolver::new(ConflictDecision::TakeUpstream))?
        } else {
            sync::apply(&materializer, plan, &mut DeferResolver)?
        };
        print_sync_report(&report);
        return check_sync_failures(&report);
    }

    let report = materializer.install(&resolution, force)?;
    print_install_report(&name, &report);

    match report.failed {
        None => Ok(()),
        Some(failed) => Err(CucoError::MaterializeFailed {
            name: failed.resource.name,
            path: failed.resource.path,
            reason: failed.error,
        }
        .into()),
    }
}
