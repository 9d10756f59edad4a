//! Materialized Records: the per-bundle install state.
//!
//! Every installed bundle has one record at
//! `<target_root>/.cuco-bundles/<bundle>.lock`. It lists each resource cuco
//! wrote, where it came from and two fingerprints:
//!
//! - `checksum`: what was on disk after the last install or sync (the local
//!   baseline). Absent when the resource was not on disk at that point.
//! - `upstream_checksum`: the rendered upstream content acknowledged at that
//!   point (the upstream baseline).
//!
//! The sync engine compares the current on-disk fingerprint against the first
//! and the freshly resolved upstream fingerprint against the second. The record
//! is the only state that separates "the user changed it" from "upstream
//! changed it"; it is rewritten atomically after every install and sync and
//! deleted only by `cuco remove`.
//!
//! # Format
//!
//! ```toml
//! # Auto-generated by cuco - DO NOT EDIT
//! version = 1
//! bundle = "team-review"
//! bundle_version = "1.2.0"
//! engine = "github"
//! installed_at = "2026-01-10T09:00:00Z"
//! updated_at = "2026-01-12T14:30:00Z"
//!
//! [[resources]]
//! name = "review"
//! type = "skill"
//! path = "skills/review"
//! checksum = "sha256:1f3a..."
//! upstream_checksum = "sha256:1f3a..."
//!
//! [resources.origin]
//! type = "custom"
//! source_name = "acme"
//! source = "skills/review"
//! ```

pub mod checksum;
mod io;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{RECORD_DIR, RECORD_EXTENSION, RECORD_FORMAT_VERSION};
use crate::core::ResourceType;
use crate::manifest::SourceReference;
use crate::target::TargetEngine;

pub use io::list_records;

/// Install state of one bundle in one target root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleRecord {
    /// Record format version
    pub version: u32,
    /// Bundle name
    pub bundle: String,
    /// Bundle version at the last install or sync
    pub bundle_version: String,
    /// Engine whose layout the paths follow
    pub engine: TargetEngine,
    /// First install
    pub installed_at: DateTime<Utc>,
    /// Last install or sync that rewrote the record
    pub updated_at: DateTime<Utc>,
    /// Resources in declaration order
    #[serde(default)]
    pub resources: Vec<RecordEntry>,
}

/// One materialized resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    /// Resource name
    pub name: String,
    /// Resource type
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// Installed path relative to the target root, `/`-separated
    pub path: String,
    /// On-disk fingerprint baseline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Upstream fingerprint baseline
    pub upstream_checksum: String,
    /// The user kept a local edit over upstream content
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub local_override: bool,
    /// Where the content came from
    pub origin: SourceReference,
}

impl BundleRecord {
    /// Empty record stamped with the current time.
    #[must_use]
    pub fn new(bundle: &str, bundle_version: &str, engine: TargetEngine) -> Self {
        let now = Utc::now();
        Self {
            version: RECORD_FORMAT_VERSION,
            bundle: bundle.to_string(),
            bundle_version: bundle_version.to_string(),
            engine,
            installed_at: now,
            updated_at: now,
            resources: Vec::new(),
        }
    }

    /// Record file location for a bundle under a target root.
    #[must_use]
    pub fn path_for(target_root: &Path, bundle: &str) -> PathBuf {
        target_root.join(RECORD_DIR).join(format!("{bundle}.{RECORD_EXTENSION}"))
    }

    /// Entry installed at `path`.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&RecordEntry> {
        self.resources.iter().find(|entry| entry.path == path)
    }

    /// Replaces the entry with the same path or appends a new one.
    pub fn upsert(&mut self, entry: RecordEntry) {
        match self.resources.iter_mut().find(|existing| existing.path == entry.path) {
            Some(existing) => *existing = entry,
            None => self.resources.push(entry),
        }
    }

    /// Removes and returns the entry installed at `path`.
    pub fn remove(&mut self, path: &str) -> Option<RecordEntry> {
        let index = self.resources.iter().position(|entry| entry.path == path)?;
        Some(self.resources.remove(index))
    }

    /// Marks the record as rewritten now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, checksum: &str) -> RecordEntry {
        RecordEntry {
            name: "review".to_string(),
            resource_type: ResourceType::Skill,
            path: path.to_string(),
            checksum: Some(checksum.to_string()),
            upstream_checksum: checksum.to_string(),
            local_override: false,
            origin: SourceReference::Custom {
                source_name: "acme".to_string(),
                source: "skills/review".to_string(),
            },
        }
    }

    #[test]
    fn test_path_for() {
        assert_eq!(
            BundleRecord::path_for(Path::new("/p/.github"), "team"),
            PathBuf::from("/p/.github/.cuco-bundles/team.lock")
        );
    }

    #[test]
    fn test_upsert_keeps_order() {
        let mut record = BundleRecord::new("team", "1.0.0", TargetEngine::Github);
        record.upsert(entry("skills/a", "sha256:1"));
        record.upsert(entry("skills/b", "sha256:2"));
        record.upsert(entry("skills/a", "sha256:3"));

        let paths: Vec<_> = record.resources.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["skills/a", "skills/b"]);
        assert_eq!(record.find("skills/a").unwrap().checksum.as_deref(), Some("sha256:3"));

        assert!(record.remove("skills/a").is_some());
        assert!(record.remove("skills/a").is_none());
        assert_eq!(record.resources.len(), 1);
    }
}
