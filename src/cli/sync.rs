//! `cuco sync`: re-resolve an installed bundle and reconcile it.
//!
//! Upstream-only changes are applied and local-only changes kept. Conflicts go
//! to `--keep-local` / `--take-upstream` when given, to a prompt on a terminal,
//! and are otherwise reported unresolved. Unresolved conflicts are not an
//! error; failed writes are.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CommandContext;
use super::common::{check_sync_failures, print_sync_report, resolver_for};
use crate::installer::Materializer;
use crate::manifest::find_bundle;
use crate::resolver::resolve;
use crate::source::SourceManager;
use crate::sync::{self, locate_installed};
use crate::target::TargetEngine;

/// Re-resolve an installed bundle and apply upstream changes.
#[derive(Args)]
pub struct SyncCommand {
    /// Bundle name in the registry, or path to a bundle directory
    bundle: String,

    /// Target engine instead of detection (github, claude, cuco)
    #[arg(long)]
    engine: Option<TargetEngine>,

    /// Keep the local copy of every conflicting resource
    #[arg(long, conflicts_with = "take_upstream")]
    keep_local: bool,

    /// Replace every conflicting resource with upstream
    #[arg(long)]
    take_upstream: bool,
}

impl SyncCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let config = ctx.load_config().await?;
        let bundle = find_bundle(&self.bundle, config.registry_dir())?;
        let name = bundle.manifest.name.clone();

        let (target, record) = locate_installed(ctx.project_root(), &name, self.engine)?;
        println!("{} bundle '{}' in {}", "Syncing".cyan().bold(), name, target.root.display());

        let mut sources = SourceManager::new(config);
        let resolution = resolve(&bundle, &mut sources).await?;
        let materializer = Materializer::new(&target);

        let plan = sync::plan(&materializer, &resolution, record)?;
        let mut resolver = resolver_for(self.keep_local, self.take_upstream);
        let report = sync::apply(&materializer, plan, resolver.as_mut())?;
        print_sync_report(&report);
        check_sync_failures(&report)
    }
}
