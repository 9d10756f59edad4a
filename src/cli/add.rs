//! `cuco add`: install one registry resource without writing a bundle.
//!
//! The resource is installed as a one-entry bundle named `<type>.<name>`, so
//! it gets an install record like any bundle. Running `add` again re-syncs it;
//! `cuco remove agent.reviewer` removes it.
//!
//! ```bash
//! cuco add agent reviewer
//! cuco add skill review --engine claude
//! ```

use anyhow::Result;
use clap::Args;

use super::CommandContext;
use super::install::install_bundle;
use crate::core::ResourceType;
use crate::manifest::{find_registry_item, single_resource_bundle};
use crate::target::TargetEngine;

/// Install a single resource from the registry.
#[derive(Args)]
pub struct AddCommand {
    /// Resource type (agent, prompt, skill, instruction)
    resource_type: ResourceType,

    /// Resource name in the registry
    name: String,

    /// Target engine instead of detection (github, claude, cuco)
    #[arg(long)]
    engine: Option<TargetEngine>,

    /// Overwrite an existing file that differs from the registry copy
    #[arg(long)]
    force: bool,
}

impl AddCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let config = ctx.load_config().await?;
        let registry = config.registry_dir().to_path_buf();
        let item = find_registry_item(&registry, self.resource_type, &self.name)?;
        let bundle = single_resource_bundle(&registry, &item)?;
        install_bundle(ctx, config, &bundle, self.engine, self.force).await
    }
}
