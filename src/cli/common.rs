//! Shared context, report printing and the interactive conflict prompt.

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use crate::config::{ConfigOverrides, SourceConfig};
use crate::core::{CucoError, ResourceType};
use crate::installer::InstallReport;
use crate::sync::{
    ConflictDecision, ConflictResolver, DeferResolver, PolicyResolver, SyncAction, SyncItem,
    SyncPlan, SyncReport, SyncStatus,
};

/// Project root and environment overrides for one invocation.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Project root directory
    pub project_root: PathBuf,
    /// Path overrides from the environment
    pub overrides: ConfigOverrides,
}

impl CommandContext {
    /// Context for `project` (default: current directory).
    pub fn new(project: Option<PathBuf>) -> Result<Self> {
        let project_root = match project {
            Some(path) => path,
            None => std::env::current_dir().context("Cannot determine current directory")?,
        };
        if !project_root.is_dir() {
            return Err(CucoError::ConfigError {
                message: format!("project directory {} does not exist", project_root.display()),
            }
            .into());
        }
        Ok(Self {
            project_root,
            overrides: ConfigOverrides::from_env(),
        })
    }

    /// Loads source configuration for this project.
    pub async fn load_config(&self) -> Result<SourceConfig> {
        SourceConfig::load(&self.project_root, &self.overrides).await
    }

    /// Project root.
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}

/// Conflict resolver chosen from command-line flags.
///
/// Explicit policies win; otherwise conflicts are prompted for on a terminal
/// and deferred everywhere else.
pub fn resolver_for(keep_local: bool, take_upstream: bool) -> Box<dyn ConflictResolver> {
    if keep_local {
        Box::new(PolicyResolver::new(ConflictDecision::KeepLocal))
    } else if take_upstream {
        Box::new(PolicyResolver::new(ConflictDecision::TakeUpstream))
    } else if io::stdin().is_terminal() {
        Box::new(InteractiveResolver)
    } else {
        Box::new(DeferResolver)
    }
}

/// Asks on the terminal for each conflict.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractiveResolver;

impl ConflictResolver for InteractiveResolver {
    fn decide(&mut self, item: &SyncItem) -> Result<ConflictDecision> {
        println!(
            "{} {} '{}' ({}) changed locally and upstream",
            "Conflict:".yellow().bold(),
            item.resource_type,
            item.name,
            item.path
        );
        let stdin = io::stdin();
        loop {
            print!("  [l]keep local / [u]take upstream / [s]kip: ");
            io::stdout().flush()?;

            let mut answer = String::new();
            if stdin.lock().read_line(&mut answer)? == 0 {
                return Ok(ConflictDecision::Defer);
            }
            if let Some(decision) = parse_decision(&answer) {
                return Ok(decision);
            }
        }
    }
}

fn parse_decision(answer: &str) -> Option<ConflictDecision> {
    match answer.trim().to_lowercase().as_str() {
        "l" | "local" | "keep" => Some(ConflictDecision::KeepLocal),
        "u" | "upstream" | "take" => Some(ConflictDecision::TakeUpstream),
        "s" | "skip" | "" => Some(ConflictDecision::Defer),
        _ => None,
    }
}

/// Prints resolution warnings.
pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("{} {warning}", "warning:".yellow().bold());
    }
}

fn describe(resource_type: ResourceType, name: &str, path: &str) -> String {
    format!("{resource_type} {} -> {}", name.bold(), path.dimmed())
}

/// Prints an install report.
pub fn print_install_report(bundle: &str, report: &InstallReport) {
    print_warnings(&report.warnings);
    for resource in &report.installed {
        println!("  {} {}", "+".green(), describe(resource.resource_type, &resource.name, &resource.path));
    }
    for resource in &report.unchanged {
        println!("  {} {}", "=".dimmed(), describe(resource.resource_type, &resource.name, &resource.path));
    }
    if let Some(failed) = &report.failed {
        let resource = &failed.resource;
        println!("  {} {}", "x".red(), describe(resource.resource_type, &resource.name, &resource.path));
        println!("      {}", failed.error.red());
    }
    for resource in &report.not_written {
        println!(
            "  {} {} {}",
            "-".yellow(),
            describe(resource.resource_type, &resource.name, &resource.path),
            "(not written)".yellow()
        );
    }

    if report.is_complete() {
        println!(
            "\n{} bundle '{}' ({} written, {} unchanged)",
            "Installed".green().bold(),
            bundle,
            report.installed.len(),
            report.unchanged.len()
        );
    } else {
        println!(
            "\n{} bundle '{}': {} written, 1 failed, {} not written",
            "Partially installed".red().bold(),
            bundle,
            report.installed.len(),
            report.not_written.len()
        );
    }
}

fn status_marker(status: SyncStatus) -> colored::ColoredString {
    match status {
        SyncStatus::Unchanged => "unchanged".dimmed(),
        SyncStatus::UpstreamUpdated => "upstream updated".cyan(),
        SyncStatus::LocallyModified => "locally modified".yellow(),
        SyncStatus::Conflicting => "conflicting".red(),
        SyncStatus::New => "new".green(),
        SyncStatus::Orphaned => "orphaned".magenta(),
        SyncStatus::Unreadable => "unreadable".red().bold(),
    }
}

/// Prints a sync plan as a status table.
pub fn print_plan(plan: &SyncPlan) {
    print_warnings(&plan.warnings);
    if plan.record.is_none() {
        println!("{}", "No install record; existing files are treated as conflicts.".yellow());
    }
    for item in &plan.items {
        println!(
            "  {:<18} {}",
            status_marker(item.status),
            describe(item.resource_type, &item.name, &item.path)
        );
        if let Some(error) = &item.error {
            println!("      {}", error.red());
        }
    }
}

/// Prints a sync report.
pub fn print_sync_report(report: &SyncReport) {
    print_warnings(&report.warnings);
    for outcome in &report.outcomes {
        let action = match &outcome.action {
            SyncAction::None => String::new(),
            SyncAction::Updated => "updated".green().to_string(),
            SyncAction::Installed => "installed".green().to_string(),
            SyncAction::KeptLocal => "kept local".yellow().to_string(),
            SyncAction::TookUpstream => "took upstream".green().to_string(),
            SyncAction::Deferred => "unresolved".red().bold().to_string(),
            SyncAction::Dropped => "dropped from record".magenta().to_string(),
            SyncAction::Failed(error) => format!("{} {}", "failed:".red().bold(), error),
        };
        println!(
            "  {:<18} {} {}",
            status_marker(outcome.status),
            describe(outcome.resource_type, &outcome.name, &outcome.path),
            action
        );
    }

    let deferred = report.deferred().count();
    if deferred > 0 {
        println!(
            "\n{} {deferred} conflict(s) left unresolved; rerun with --keep-local or --take-upstream",
            "Note:".yellow().bold()
        );
    }
    println!("\n{} bundle '{}'", "Synced".green().bold(), report.bundle);
}

/// Fails when any resource of a sync report failed.
pub fn check_sync_failures(report: &SyncReport) -> Result<()> {
    let failed: Vec<_> = report.failed().collect();
    match failed.first() {
        None => Ok(()),
        Some(first) => Err(CucoError::MaterializeFailed {
            name: first.name.clone(),
            path: first.path.clone(),
            reason: format!("{} resource(s) failed to sync", failed.len()),
        }
        .into()),
    }
}
