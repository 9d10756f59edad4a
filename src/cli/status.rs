//! `cuco status`: classify a bundle's resources without writing.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CommandContext;
use super::common::print_plan;
use crate::installer::Materializer;
use crate::manifest::find_bundle;
use crate::resolver::resolve;
use crate::source::SourceManager;
use crate::sync::{self, SyncStatus, locate_installed};
use crate::target::TargetEngine;

/// Show how each resource of a bundle would sync.
#[derive(Args)]
pub struct StatusCommand {
    /// Bundle name in the registry, or path to a bundle directory
    bundle: String,

    /// Target engine instead of detection (github, claude, cuco)
    #[arg(long)]
    engine: Option<TargetEngine>,
}

impl StatusCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let config = ctx.load_config().await?;
        let bundle = find_bundle(&self.bundle, config.registry_dir())?;
        let name = bundle.manifest.name.clone();

        let (target, record) = locate_installed(ctx.project_root(), &name, self.engine)?;
        let mut sources = SourceManager::new(config);
        let resolution = resolve(&bundle, &mut sources).await?;

        let plan = sync::plan(&Materializer::new(&target), &resolution, record)?;
        println!("{} '{}' in {}", "Bundle".bold(), name, target.root.display());
        print_plan(&plan);

        if plan.is_noop() {
            println!("\n{}", "Up to date".green());
        } else {
            let conflicts = plan.with_status(SyncStatus::Conflicting).count();
            if conflicts > 0 {
                println!("\n{} conflict(s) need a decision on sync", conflicts.to_string().red());
            }
            let unreadable = plan.with_status(SyncStatus::Unreadable).count();
            if unreadable > 0 {
                println!("{} resource(s) could not be read", unreadable.to_string().red());
            }
        }
        Ok(())
    }
}
