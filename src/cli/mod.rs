//! Command-line interface for cuco.
//!
//! # Command Overview
//!
//! ```bash
//! cuco init --engine claude           # create .claude/ and its subdirectories
//! cuco install team-review            # install a registry bundle
//! cuco install ./bundles/mine         # install a bundle directory
//! cuco status team-review             # classify without writing
//! cuco sync team-review --keep-local  # re-sync, keep local edits on conflict
//! cuco remove team-review             # remove unmodified resources and the record
//! cuco bundle list                    # bundles in the registry
//! cuco list agents                    # single resources in the registry
//! cuco add agent reviewer             # install one registry resource
//! cuco source add acme git@github.com:acme/copilot.git
//! ```
//!
//! Every command runs against a project root (`--project`, default the current
//! directory). Configuration is loaded once per invocation; see
//! [`crate::config`].

mod add;
mod bundle;
mod common;
mod init;
mod install;
mod list;
mod remove;
mod source;
mod status;
mod sync;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use common::{CommandContext, InteractiveResolver};

/// Bundle installer and sync engine for AI coding-assistant customizations.
#[derive(Parser)]
#[command(name = "cuco", version, about, long_about = None)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress log output.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Project root (defaults to the current directory).
    #[arg(long, global = true, value_name = "DIR")]
    project: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a target engine folder and its resource subdirectories.
    Init(init::InitCommand),

    /// Resolve a bundle and materialize it into the target folder.
    Install(install::InstallCommand),

    /// Re-resolve an installed bundle and apply upstream changes.
    Sync(sync::SyncCommand),

    /// Show how each resource of a bundle would sync, without writing.
    Status(status::StatusCommand),

    /// Remove an installed bundle.
    Remove(remove::RemoveCommand),

    /// Install a single resource from the registry.
    Add(add::AddCommand),

    /// List registry resources of one type.
    List(list::ListCommand),

    /// Inspect bundles in the registry.
    Bundle(bundle::BundleCommand),

    /// Manage named git sources.
    Source(source::SourceCommand),
}

impl Cli {
    /// Log filter implied by `--verbose` / `--quiet`; `None` disables logging.
    #[must_use]
    pub fn log_filter(&self) -> Option<&'static str> {
        if self.verbose {
            Some("cuco_cli=debug,info")
        } else if self.quiet {
            None
        } else {
            Some("warn")
        }
    }

    /// Runs the selected command.
    pub async fn execute(self) -> Result<()> {
        let ctx = CommandContext::new(self.project)?;
        match self.command {
            Commands::Init(cmd) => cmd.execute(&ctx),
            Commands::Install(cmd) => cmd.execute(&ctx).await,
            Commands::Sync(cmd) => cmd.execute(&ctx).await,
            Commands::Status(cmd) => cmd.execute(&ctx).await,
            Commands::Remove(cmd) => cmd.execute(&ctx),
            Commands::Add(cmd) => cmd.execute(&ctx).await,
            Commands::List(cmd) => cmd.execute(&ctx).await,
            Commands::Bundle(cmd) => cmd.execute(&ctx).await,
            Commands::Source(cmd) => cmd.execute(&ctx).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_filter_flags() {
        let cli = Cli::parse_from(["cuco", "-v", "bundle", "list"]);
        assert_eq!(cli.log_filter(), Some("cuco_cli=debug,info"));
        let cli = Cli::parse_from(["cuco", "bundle", "list", "--quiet"]);
        assert_eq!(cli.log_filter(), None);
        let cli = Cli::parse_from(["cuco", "bundle", "list"]);
        assert_eq!(cli.log_filter(), Some("warn"));
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["cuco", "-v", "-q", "bundle", "list"]).is_err());
    }

    #[test]
    fn test_add_and_list_parse_resource_types() {
        assert!(Cli::try_parse_from(["cuco", "add", "agent", "reviewer"]).is_ok());
        assert!(Cli::try_parse_from(["cuco", "add", "skills", "review", "--force"]).is_ok());
        assert!(Cli::try_parse_from(["cuco", "add", "hook", "x"]).is_err());
        assert!(Cli::try_parse_from(["cuco", "list", "prompts"]).is_ok());
        assert!(Cli::try_parse_from(["cuco", "list"]).is_err());
    }

    #[test]
    fn test_sync_policies_conflict() {
        assert!(
            Cli::try_parse_from(["cuco", "sync", "team", "--keep-local", "--take-upstream"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["cuco", "sync", "team", "--take-upstream"]).is_ok());
    }
}
