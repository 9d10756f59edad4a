//! Materialization of resolved resources into a target tree.
//!
//! Installing a resource has three steps:
//!
//! 1. **Render**: read the source file or skill directory into memory and apply
//!    placeholder substitution ([`crate::templating`]). The fingerprint of the
//!    rendered content is the resource's upstream fingerprint.
//! 2. **Write**: place the rendered content at its layout destination.
//!    Single files go through [`atomic_write`]; skill directories are staged
//!    and swapped in with [`atomic_replace_dir`]. Every destination is checked
//!    to lie inside the target root first. Content that already matches on disk
//!    is not rewritten.
//! 3. **Record**: append `(origin, fingerprint, path)` to the bundle record.
//!
//! An install is atomic per resource but not across the bundle: it stops at
//! the first failure, keeps what was written before it and saves a record
//! covering exactly those resources. [`InstallReport`] lists what was and was
//! not written.

use anyhow::{Context, Result};
use std::fs;
use tracing::{debug, info, warn};

use crate::core::{CucoError, ResourceType};
use crate::lockfile::checksum::{fingerprint_bytes, fingerprint_files, fingerprint_if_present};
use crate::lockfile::{BundleRecord, RecordEntry};
use crate::resolver::{Resolution, ResolvedResource};
use crate::target::DetectedTarget;
use crate::templating::Placeholders;
use crate::utils::fs::{atomic_replace_dir, atomic_write, read_tree};
use crate::utils::path_validation::ensure_within;
use crate::utils::platform::normalize_path_for_storage;

/// Rendered content of one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceContent {
    /// Single file
    File(Vec<u8>),
    /// Directory tree as `(relative path, content)` pairs
    Tree(Vec<(String, Vec<u8>)>),
}

impl ResourceContent {
    /// Fingerprint, comparable with an on-disk fingerprint of the same shape.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        match self {
            Self::File(bytes) => fingerprint_bytes(bytes),
            Self::Tree(files) => fingerprint_files(files),
        }
    }
}

/// A resolved resource rendered for a specific target.
#[derive(Debug, Clone)]
pub struct RenderedResource {
    /// The resolved resource
    pub resource: ResolvedResource,
    /// Destination relative to the target root, `/`-separated
    pub path: String,
    /// Content to write
    pub content: ResourceContent,
    /// Fingerprint of `content`
    pub fingerprint: String,
}

impl RenderedResource {
    /// Record entry describing this resource as written.
    #[must_use]
    pub fn record_entry(&self) -> RecordEntry {
        RecordEntry {
            name: self.resource.name.clone(),
            resource_type: self.resource.resource_type,
            path: self.path.clone(),
            checksum: Some(self.fingerprint.clone()),
            upstream_checksum: self.fingerprint.clone(),
            local_override: false,
            origin: self.resource.origin.clone(),
        }
    }

    /// `type 'name' -> path` label for reports.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} '{}' -> {}", self.resource.resource_type, self.resource.name, self.path)
    }
}

/// A resource named in an [`InstallReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedResource {
    /// Resource name
    pub name: String,
    /// Resource type
    pub resource_type: ResourceType,
    /// Destination relative to the target root
    pub path: String,
}

impl From<&RenderedResource> for ReportedResource {
    fn from(rendered: &RenderedResource) -> Self {
        Self {
            name: rendered.resource.name.clone(),
            resource_type: rendered.resource.resource_type,
            path: rendered.path.clone(),
        }
    }
}

/// The resource an install stopped at.
#[derive(Debug, Clone)]
pub struct FailedResource {
    /// Resource that was not written
    pub resource: ReportedResource,
    /// Error text
    pub error: String,
}

/// Outcome of [`Materializer::install`].
#[derive(Debug, Clone, Default)]
pub struct InstallReport {
    /// Written, in order
    pub installed: Vec<ReportedResource>,
    /// Already identical on disk
    pub unchanged: Vec<ReportedResource>,
    /// Resource whose write failed
    pub failed: Option<FailedResource>,
    /// Resources after the failure, never attempted
    pub not_written: Vec<ReportedResource>,
    /// Resolution warnings carried through
    pub warnings: Vec<String>,
}

impl InstallReport {
    /// Whether every resource is in place.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failed.is_none()
    }
}

/// Writes resources into one target tree.
pub struct Materializer<'a> {
    target: &'a DetectedTarget,
}

impl<'a> Materializer<'a> {
    /// Materializer for a detected target.
    #[must_use]
    pub const fn new(target: &'a DetectedTarget) -> Self {
        Self {
            target,
        }
    }

    /// Target this materializer writes to.
    #[must_use]
    pub const fn target(&self) -> &DetectedTarget {
        self.target
    }

    /// Loads and renders a resolved resource for this target's layout.
    pub fn render(&self, resource: &ResolvedResource) -> Result<RenderedResource> {
        let placeholders = Placeholders::for_name(&resource.name);
        let source = &resource.source_path;

        let content = if resource.is_directory() {
            let files = read_tree(source)?
                .into_iter()
                .map(|(path, bytes)| (path, placeholders.render(bytes)))
                .collect();
            ResourceContent::Tree(files)
        } else {
            let bytes = fs::read(source)
                .with_context(|| format!("Failed to read resource {}", source.display()))?;
            ResourceContent::File(placeholders.render(bytes))
        };

        let fingerprint = content.fingerprint();
        Ok(RenderedResource {
            path: normalize_path_for_storage(resource.destination(&self.target.layout)),
            resource: resource.clone(),
            content,
            fingerprint,
        })
    }

    /// Fingerprint of whatever is at a target-relative path, if anything.
    pub fn on_disk_fingerprint(&self, path: &str) -> Result<Option<String>> {
        fingerprint_if_present(&self.target.root.join(path))
    }

    /// Writes a rendered resource. Returns `false` when the destination already
    /// held identical content and nothing was written.
    pub fn write(&self, rendered: &RenderedResource) -> Result<bool> {
        let destination = self.target.root.join(&rendered.path);
        ensure_within(&self.target.root, &destination)?;

        if self.on_disk_fingerprint(&rendered.path)?.as_deref() == Some(rendered.fingerprint.as_str()) {
            debug!("{} is up to date", destination.display());
            return Ok(false);
        }

        let result = match &rendered.content {
            ResourceContent::File(bytes) => atomic_write(&destination, bytes),
            ResourceContent::Tree(files) => atomic_replace_dir(&destination, files),
        };
        result.map_err(|e| CucoError::MaterializeFailed {
            name: rendered.resource.name.clone(),
            path: destination.display().to_string(),
            reason: format!("{e:#}"),
        })?;

        debug!("Wrote {}", destination.display());
        Ok(true)
    }

    /// Installs every resource of a resolution in order and saves the record.
    ///
    /// Existing destinations whose content differs are overwritten only with
    /// `force`; otherwise the install stops there. The returned report covers
    /// partial installs; `Err` is reserved for failures outside any single
    /// resource, such as saving the record.
    pub fn install(&self, resolution: &Resolution, force: bool) -> Result<InstallReport> {
        let record_path = BundleRecord::path_for(&self.target.root, &resolution.bundle);
        let mut record = BundleRecord::load(&record_path)?.unwrap_or_else(|| {
            BundleRecord::new(&resolution.bundle, &resolution.bundle_version, self.target.engine)
        });
        record.bundle_version.clone_from(&resolution.bundle_version);

        let mut report = InstallReport {
            warnings: resolution.warnings.clone(),
            ..InstallReport::default()
        };

        let mut pending = resolution.resources.iter();
        for resource in pending.by_ref() {
            let outcome = self.render(resource).and_then(|rendered| {
                let existing = self.on_disk_fingerprint(&rendered.path)?;
                if let Some(existing) = existing
                    && existing != rendered.fingerprint
                    && !force
                    && record.find(&rendered.path).is_none()
                {
                    return Err(CucoError::MaterializeFailed {
                        name: rendered.resource.name.clone(),
                        path: rendered.path.clone(),
                        reason: "destination exists with different content (use --force to overwrite)"
                            .to_string(),
                    }
                    .into());
                }
                let written = self.write(&rendered)?;
                Ok((rendered, written))
            });

            match outcome {
                Ok((rendered, written)) => {
                    record.upsert(rendered.record_entry());
                    if written {
                        info!("Installed {}", rendered.label());
                        report.installed.push((&rendered).into());
                    } else {
                        report.unchanged.push((&rendered).into());
                    }
                }
                Err(e) => {
                    warn!("Failed to install {} '{}': {e:#}", resource.resource_type, resource.name);
                    report.failed = Some(FailedResource {
                        resource: self.report_entry(resource),
                        error: format!("{e:#}"),
                    });
                    break;
                }
            }
        }
        report.not_written = pending.map(|resource| self.report_entry(resource)).collect();

        if !record.resources.is_empty() {
            record.touch();
            record.save(&record_path)?;
        }
        Ok(report)
    }

    fn report_entry(&self, resource: &ResolvedResource) -> ReportedResource {
        ReportedResource {
            name: resource.name.clone(),
            resource_type: resource.resource_type,
            path: normalize_path_for_storage(resource.destination(&self.target.layout)),
        }
    }
}
