//! `cuco source`: named git sources.
//!
//! ```bash
//! cuco source add acme https://github.com/acme/copilot.git          # project scope
//! cuco source add acme git@github.com:acme/copilot.git --global     # user scope
//! cuco source list
//! cuco source remove acme
//! ```
//!
//! Removing a source leaves its cache entry in place.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use super::CommandContext;
use crate::config::{RegisterOutcome, SourceScope};
use crate::git::strip_auth_from_url;

/// Manage named git sources.
#[derive(Args)]
pub struct SourceCommand {
    #[command(subcommand)]
    command: SourceSubcommand,
}

#[derive(Subcommand)]
enum SourceSubcommand {
    /// Register a named source.
    Add {
        /// Source name
        name: String,
        /// Git URL (https, ssh or file://)
        url: String,
        /// Register in the user-wide configuration
        #[arg(long)]
        global: bool,
        /// Replace an existing source with a different URL
        #[arg(long)]
        force: bool,
    },
    /// List registered sources.
    List,
    /// Unregister a named source.
    Remove {
        /// Source name
        name: String,
        /// Remove from the user-wide configuration
        #[arg(long)]
        global: bool,
    },
}

const fn scope(global: bool) -> SourceScope {
    if global { SourceScope::Global } else { SourceScope::Project }
}

impl SourceCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let mut config = ctx.load_config().await?;
        match self.command {
            SourceSubcommand::Add {
                name,
                url,
                global,
                force,
            } => {
                let scope = scope(global);
                match config.register(&name, &url, scope, force)? {
                    RegisterOutcome::Unchanged => {
                        println!("Source '{name}' already points to {}", strip_auth_from_url(&url));
                        return Ok(());
                    }
                    RegisterOutcome::Replaced {
                        previous,
                    } => println!(
                        "{} {scope} source '{}' (was {})",
                        "Replaced".yellow().bold(),
                        name.cyan(),
                        strip_auth_from_url(&previous)
                    ),
                    RegisterOutcome::Added => println!(
                        "{} {scope} source '{}': {}",
                        "Added".green().bold(),
                        name.cyan(),
                        strip_auth_from_url(&url)
                    ),
                }
                config.save(scope).await?;
                println!("  saved to {}", config.path_of(scope).display());
            }
            SourceSubcommand::List => {
                let sources = config.list();
                if sources.is_empty() {
                    println!("No sources registered.");
                    println!("\n{}", "Tip:".yellow());
                    println!("  Add a source with: cuco source add <name> <git-url>");
                    return Ok(());
                }
                for source in sources {
                    let line = format!(
                        "  {} {} [{}]",
                        source.name.cyan(),
                        strip_auth_from_url(&source.url),
                        source.scope
                    );
                    if source.shadowed {
                        println!("{} {}", line.dimmed(), "(shadowed by project)".dimmed());
                    } else {
                        println!("{line}");
                    }
                }
            }
            SourceSubcommand::Remove {
                name,
                global,
            } => {
                let scope = scope(global);
                let url = config.remove(&name, scope)?;
                config.save(scope).await?;
                println!(
                    "{} {scope} source '{}' ({})",
                    "Removed".green().bold(),
                    name.red(),
                    strip_auth_from_url(&url)
                );
            }
        }
        Ok(())
    }
}
