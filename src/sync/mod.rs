//! Conflict-aware re-synchronization of an installed bundle.
//!
//! Each resource is classified from three fingerprints: the record's baselines
//! (`checksum` for disk, `upstream_checksum` for upstream), the current on-disk
//! content, and the freshly resolved and rendered upstream content.
//!
//! | on disk vs baseline | upstream vs baseline | status | action |
//! |---|---|---|---|
//! | equal | equal | [`SyncStatus::Unchanged`] | none |
//! | equal | differ | [`SyncStatus::UpstreamUpdated`] | write upstream |
//! | differ | equal | [`SyncStatus::LocallyModified`] | keep local |
//! | differ | differ | [`SyncStatus::Conflicting`] | ask the [`ConflictResolver`] |
//!
//! Two refinements:
//!
//! - A resource whose record entry has `local_override` set (the user kept a
//!   local edit before) is `Conflicting` when upstream changes again, never
//!   silently overwritten.
//! - Resources not in the record are `New` when nothing is on disk, otherwise
//!   `Conflicting`. Without any record every on-disk resource is therefore a
//!   conflict. Recorded resources that are no longer declared are `Orphaned`:
//!   dropped from the record, files left alone.
//!
//! After applying, each entry's baselines are the current on-disk and upstream
//! fingerprints, whichever branch was taken, so a repeated sync without new
//! changes is a no-op. Deferred conflicts keep their old entry.
//!
//! Failures are scoped to one resource. A resource that cannot be rendered or
//! fingerprinted is [`SyncStatus::Unreadable`]; it and any failed write or
//! resolver error are reported as [`SyncAction::Failed`], keep their old
//! record entry, and the remaining resources are still synced.

pub mod conflict;

use anyhow::Result;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::core::{CucoError, ResourceType};
use crate::installer::{Materializer, RenderedResource};
use crate::lockfile::{BundleRecord, RecordEntry};
use crate::resolver::Resolution;
use crate::target::{DetectedTarget, TargetEngine, select};
use crate::utils::path_validation::is_safe_file_name;
use crate::utils::platform::normalize_path_for_storage;

pub use conflict::{ConflictDecision, ConflictResolver, DeferResolver, PolicyResolver};

/// Classification of one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Neither side changed
    Unchanged,
    /// Only upstream changed
    UpstreamUpdated,
    /// Only the on-disk copy changed
    LocallyModified,
    /// Both changed, or the baseline is unknown and something is on disk
    Conflicting,
    /// Declared but never installed, nothing on disk
    New,
    /// Recorded but no longer declared
    Orphaned,
    /// Upstream or on-disk content could not be read
    Unreadable,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unchanged => "unchanged",
            Self::UpstreamUpdated => "upstream updated",
            Self::LocallyModified => "locally modified",
            Self::Conflicting => "conflicting",
            Self::New => "new",
            Self::Orphaned => "orphaned",
            Self::Unreadable => "unreadable",
        })
    }
}

/// Classifies a declared resource.
///
/// `recorded` is the record entry at the same path, if any.
#[must_use]
pub fn classify(recorded: Option<&RecordEntry>, on_disk: Option<&str>, upstream: &str) -> SyncStatus {
    let Some(recorded) = recorded else {
        return if on_disk.is_some() { SyncStatus::Conflicting } else { SyncStatus::New };
    };

    let local_changed = on_disk != recorded.checksum.as_deref();
    let upstream_changed = upstream != recorded.upstream_checksum;

    match (local_changed, upstream_changed) {
        (false, false) => SyncStatus::Unchanged,
        (false, true) if recorded.local_override => SyncStatus::Conflicting,
        (false, true) => SyncStatus::UpstreamUpdated,
        (true, false) => SyncStatus::LocallyModified,
        (true, true) => SyncStatus::Conflicting,
    }
}

/// One classified resource.
#[derive(Debug, Clone)]
pub struct SyncItem {
    /// Resource name
    pub name: String,
    /// Resource type
    pub resource_type: ResourceType,
    /// Path relative to the target root
    pub path: String,
    /// Classification
    pub status: SyncStatus,
    /// Current on-disk fingerprint
    pub on_disk: Option<String>,
    /// Record entry before this sync
    pub recorded: Option<RecordEntry>,
    /// Fresh upstream content; `None` for orphaned and unreadable resources
    pub upstream: Option<RenderedResource>,
    /// Why an [`SyncStatus::Unreadable`] resource could not be classified
    pub error: Option<String>,
}

/// Classification of a whole bundle, computed without writing anything.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    /// Bundle name
    pub bundle: String,
    /// Bundle version from the fresh resolution
    pub bundle_version: String,
    /// Declared resources in declaration order, then orphaned ones
    pub items: Vec<SyncItem>,
    /// Record before this sync
    pub record: Option<BundleRecord>,
    /// Resolution warnings
    pub warnings: Vec<String>,
}

impl SyncPlan {
    /// Items with a given status.
    pub fn with_status(&self, status: SyncStatus) -> impl Iterator<Item = &SyncItem> {
        self.items.iter().filter(move |item| item.status == status)
    }

    /// Whether applying would change nothing on disk or in the record.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.record.is_some() && self.items.iter().all(|item| item.status == SyncStatus::Unchanged)
    }
}

/// Builds the sync plan for a fresh resolution against an existing record.
pub fn plan(
    materializer: &Materializer<'_>,
    resolution: &Resolution,
    record: Option<BundleRecord>,
) -> Result<SyncPlan> {
    let mut items = Vec::with_capacity(resolution.resources.len());

    for resource in &resolution.resources {
        let path = normalize_path_for_storage(resource.destination(&materializer.target().layout));
        let recorded = record.as_ref().and_then(|r| r.find(&path)).cloned();

        let read = materializer.render(resource).and_then(|rendered| {
            let on_disk = materializer.on_disk_fingerprint(&rendered.path)?;
            Ok((rendered, on_disk))
        });
        let item = match read {
            Ok((rendered, on_disk)) => {
                let status = classify(recorded.as_ref(), on_disk.as_deref(), &rendered.fingerprint);
                debug!("{}: {status}", rendered.label());
                SyncItem {
                    name: resource.name.clone(),
                    resource_type: resource.resource_type,
                    path: rendered.path.clone(),
                    status,
                    on_disk,
                    recorded,
                    upstream: Some(rendered),
                    error: None,
                }
            }
            Err(e) => {
                warn!("Cannot classify {} '{}': {e:#}", resource.resource_type, resource.name);
                SyncItem {
                    name: resource.name.clone(),
                    resource_type: resource.resource_type,
                    path,
                    status: SyncStatus::Unreadable,
                    on_disk: None,
                    recorded,
                    upstream: None,
                    error: Some(format!("{e:#}")),
                }
            }
        };
        items.push(item);
    }

    if let Some(record) = &record {
        for entry in &record.resources {
            if items.iter().any(|item| item.path == entry.path) {
                continue;
            }
            // The orphan's files are never touched, so an unreadable one is still dropped.
            let on_disk = materializer.on_disk_fingerprint(&entry.path).unwrap_or_else(|e| {
                debug!("Cannot fingerprint orphaned {}: {e:#}", entry.path);
                None
            });
            items.push(SyncItem {
                name: entry.name.clone(),
                resource_type: entry.resource_type,
                path: entry.path.clone(),
                status: SyncStatus::Orphaned,
                on_disk,
                recorded: Some(entry.clone()),
                upstream: None,
                error: None,
            });
        }
    }

    Ok(SyncPlan {
        bundle: resolution.bundle.clone(),
        bundle_version: resolution.bundle_version.clone(),
        items,
        record,
        warnings: resolution.warnings.clone(),
    })
}

/// What happened to one resource during [`apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Nothing to do
    None,
    /// Upstream content written
    Updated,
    /// New resource written
    Installed,
    /// Local content kept
    KeptLocal,
    /// Conflict resolved in favor of upstream
    TookUpstream,
    /// Conflict left unresolved
    Deferred,
    /// Dropped from the record, files left on disk
    Dropped,
    /// Resource could not be read or written, or no decision could be made
    Failed(String),
}

/// Result for one resource.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// Resource name
    pub name: String,
    /// Resource type
    pub resource_type: ResourceType,
    /// Path relative to the target root
    pub path: String,
    /// Classification before applying
    pub status: SyncStatus,
    /// Action taken
    pub action: SyncAction,
}

/// Outcome of [`apply`].
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Bundle name
    pub bundle: String,
    /// One outcome per planned item, in plan order
    pub outcomes: Vec<SyncOutcome>,
    /// Resolution warnings
    pub warnings: Vec<String>,
    /// Whether the record was rewritten
    pub record_written: bool,
}

impl SyncReport {
    /// Conflicts left unresolved.
    pub fn deferred(&self) -> impl Iterator<Item = &SyncOutcome> {
        self.outcomes.iter().filter(|o| o.action == SyncAction::Deferred)
    }

    /// Resources that failed to sync.
    pub fn failed(&self) -> impl Iterator<Item = &SyncOutcome> {
        self.outcomes.iter().filter(|o| matches!(o.action, SyncAction::Failed(_)))
    }
}

/// Applies a plan: writes what the classification and the resolver call for,
/// then rewrites the record.
pub fn apply(
    materializer: &Materializer<'_>,
    plan: SyncPlan,
    resolver: &mut dyn ConflictResolver,
) -> Result<SyncReport> {
    let target = materializer.target();
    let record_path = BundleRecord::path_for(&target.root, &plan.bundle);
    let had_record = plan.record.is_some();

    let mut record = match plan.record.clone() {
        Some(mut previous) => {
            previous.resources.clear();
            previous.bundle_version.clone_from(&plan.bundle_version);
            previous.engine = target.engine;
            previous
        }
        None => BundleRecord::new(&plan.bundle, &plan.bundle_version, target.engine),
    };

    let mut report = SyncReport {
        bundle: plan.bundle.clone(),
        warnings: plan.warnings.clone(),
        ..SyncReport::default()
    };

    for item in &plan.items {
        let (action, entry) = apply_item(materializer, item, resolver);
        if let Some(entry) = entry {
            record.upsert(entry);
        }
        match &action {
            SyncAction::Updated | SyncAction::Installed | SyncAction::TookUpstream => {
                info!("{} {} '{}': {:?}", item.status, item.resource_type, item.name, action);
            }
            SyncAction::Failed(error) => {
                warn!("Failed to sync {} '{}': {error}", item.resource_type, item.name);
            }
            _ => {}
        }
        report.outcomes.push(SyncOutcome {
            name: item.name.clone(),
            resource_type: item.resource_type,
            path: item.path.clone(),
            status: item.status,
            action,
        });
    }

    let changed = plan.record.as_ref().is_none_or(|previous| {
        previous.resources != record.resources || previous.bundle_version != record.bundle_version
    });
    if changed && (had_record || !record.resources.is_empty()) {
        record.touch();
        record.save(&record_path)?;
        report.record_written = true;
    }
    Ok(report)
}

/// Action and new record entry for one item.
fn apply_item(
    materializer: &Materializer<'_>,
    item: &SyncItem,
    resolver: &mut dyn ConflictResolver,
) -> (SyncAction, Option<RecordEntry>) {
    let unreadable = || {
        let error = item.error.clone().unwrap_or_else(|| "unreadable".to_string());
        (SyncAction::Failed(error), item.recorded.clone())
    };
    let upstream = match (&item.upstream, item.status) {
        (_, SyncStatus::Unreadable) => return unreadable(),
        (None, _) => return (SyncAction::Dropped, None),
        (Some(upstream), _) => upstream,
    };

    let kept_local = || RecordEntry {
        checksum: item.on_disk.clone(),
        local_override: true,
        ..upstream.record_entry()
    };
    let write = |success: SyncAction| match materializer.write(upstream) {
        Ok(_) => (success, Some(upstream.record_entry())),
        Err(e) => (SyncAction::Failed(format!("{e:#}")), item.recorded.clone()),
    };

    match item.status {
        SyncStatus::Unchanged => {
            let local_override = item.recorded.as_ref().is_some_and(|r| r.local_override);
            let entry = RecordEntry {
                checksum: item.on_disk.clone(),
                local_override,
                ..upstream.record_entry()
            };
            (SyncAction::None, Some(entry))
        }
        SyncStatus::UpstreamUpdated => write(SyncAction::Updated),
        SyncStatus::New => write(SyncAction::Installed),
        SyncStatus::LocallyModified => (SyncAction::KeptLocal, Some(kept_local())),
        SyncStatus::Conflicting => match resolver.decide(item) {
            Ok(ConflictDecision::KeepLocal) => (SyncAction::KeptLocal, Some(kept_local())),
            Ok(ConflictDecision::TakeUpstream) => write(SyncAction::TookUpstream),
            Ok(ConflictDecision::Defer) => (SyncAction::Deferred, item.recorded.clone()),
            Err(e) => (SyncAction::Failed(format!("{e:#}")), item.recorded.clone()),
        },
        SyncStatus::Orphaned => (SyncAction::Dropped, None),
        SyncStatus::Unreadable => unreadable(),
    }
}

/// Finds the target holding a bundle's record.
///
/// With a forced engine only that engine's folder is checked. Otherwise the
/// engines are checked in priority order and the first one holding a record
/// wins; without any record the detected target is returned.
///
/// `bundle` must be a plain file name; it names the record file.
pub fn locate_installed(
    project_root: &Path,
    bundle: &str,
    forced: Option<TargetEngine>,
) -> Result<(DetectedTarget, Option<BundleRecord>)> {
    if !is_safe_file_name(bundle) {
        return Err(CucoError::ManifestValidationError {
            reason: format!("bundle name '{bundle}' is not a valid file name"),
        }
        .into());
    }

    if let Some(engine) = forced {
        let target = DetectedTarget::for_engine(project_root, engine);
        let record = BundleRecord::load(&BundleRecord::path_for(&target.root, bundle))?;
        return Ok((target, record));
    }

    for engine in TargetEngine::PRIORITY {
        let target = DetectedTarget::for_engine(project_root, engine);
        if let Some(record) = BundleRecord::load(&BundleRecord::path_for(&target.root, bundle))? {
            return Ok((target, Some(record)));
        }
    }
    Ok((select(project_root, None), None))
}
