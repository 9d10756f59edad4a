//! `cuco remove`: delete an installed bundle.
//!
//! Resources whose on-disk content still matches the record are deleted;
//! locally modified ones are kept unless `--force` is given. The record is
//! deleted either way.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CommandContext;
use crate::core::CucoError;
use crate::lockfile::BundleRecord;
use crate::lockfile::checksum::fingerprint_if_present;
use crate::sync::locate_installed;
use crate::target::TargetEngine;
use crate::utils::fs::remove_path;
use crate::utils::path_validation::ensure_within;

/// Remove an installed bundle.
#[derive(Args)]
pub struct RemoveCommand {
    /// Name of the installed bundle
    bundle: String,

    /// Target engine instead of detection (github, claude, cuco)
    #[arg(long)]
    engine: Option<TargetEngine>,

    /// Also delete resources that were modified locally
    #[arg(long)]
    force: bool,
}

impl RemoveCommand {
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        let (target, record) = locate_installed(ctx.project_root(), &self.bundle, self.engine)?;
        let Some(record) = record else {
            return Err(CucoError::BundleNotInstalled {
                name: self.bundle,
                target: target.root.display().to_string(),
            }
            .into());
        };

        let mut kept = 0;
        for entry in &record.resources {
            let path = target.root.join(&entry.path);
            ensure_within(&target.root, &path)?;
            let on_disk = fingerprint_if_present(&path)?;
            if on_disk.is_none() {
                continue;
            }
            if on_disk == entry.checksum || self.force {
                remove_path(&path)?;
                println!("  {} {} {}", "-".red(), entry.resource_type, entry.path);
            } else {
                kept += 1;
                println!(
                    "  {} {} {} {}",
                    "!".yellow(),
                    entry.resource_type,
                    entry.path,
                    "(modified locally, kept)".yellow()
                );
            }
        }

        BundleRecord::delete(&BundleRecord::path_for(&target.root, &record.bundle))?;
        println!("{} bundle '{}'", "Removed".green().bold(), record.bundle);
        if kept > 0 {
            println!("{kept} modified resource(s) kept; use --force to delete them too");
        }
        Ok(())
    }
}
