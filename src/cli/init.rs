//! `cuco init`: explicit creation of a target engine folder.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CommandContext;
use crate::target::{TargetEngine, initialize};

/// Create a target engine folder and its resource subdirectories.
#[derive(Args)]
pub struct InitCommand {
    /// Engine to initialize (github, claude, cuco)
    #[arg(long, default_value_t = TargetEngine::Github)]
    engine: TargetEngine,
}

impl InitCommand {
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        let created = initialize(ctx.project_root(), self.engine)?;
        if created.is_empty() {
            println!("{} is already initialized", self.engine.folder().bold());
            return Ok(());
        }
        for dir in &created {
            println!("  {} {}", "+".green(), dir.display());
        }
        println!("{} {} layout", "Initialized".green().bold(), self.engine);
        Ok(())
    }
}
