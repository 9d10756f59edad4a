//! `cuco list`: browse single resources in the registry.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CommandContext;
use crate::core::ResourceType;
use crate::manifest::list_registry_items;

/// List registry resources of one type.
#[derive(Args)]
pub struct ListCommand {
    /// Resource type (agents, prompts, skills, instructions)
    resource_type: ResourceType,
}

impl ListCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let config = ctx.load_config().await?;
        let items = list_registry_items(config.registry_dir(), self.resource_type)?;
        if items.is_empty() {
            println!(
                "No {} in {}",
                self.resource_type.plural(),
                config.registry_dir().join(self.resource_type.plural()).display()
            );
            return Ok(());
        }

        println!("{} {}:", "Available".bold(), self.resource_type.plural());
        for item in items {
            println!("  {} {}", item.name.bold(), item.path.dimmed());
        }
        Ok(())
    }
}
