//! Bundle manifest parsing and validation.
//!
//! A bundle is a directory holding a `bundle.json` manifest and, optionally,
//! inline resource files referenced by it.
//!
//! # Structure
//!
//! ```json
//! {
//!   "name": "team-review",
//!   "version": "1.2.0",
//!   "description": "Code review helpers",
//!   "dependencies": {
//!     "agents": [
//!       { "name": "reviewer", "type": "reference", "source": "agents/reviewer.agent.md" }
//!     ],
//!     "skills": [
//!       { "name": "review", "type": "custom", "source_name": "acme", "source": "skills/review" },
//!       { "name": "pdf", "type": "agentskills" }
//!     ],
//!     "prompts": [
//!       { "name": "commit", "type": "inline", "path": "prompts/commit.prompt.md" }
//!     ]
//!   },
//!   "copilotInstructions": { "type": "inline", "path": "copilot-instructions.md" }
//! }
//! ```
//!
//! Dependency groups are keyed by resource type. Unknown group keys and unknown
//! entry `type` discriminants are parse errors.
//!
//! # Integration
//!
//! [`crate::resolver`] turns a parsed manifest into concrete resources, in
//! [`BundleManifest::entries`] order.

mod manifest_io;
mod manifest_validation;
mod registry_items;
mod source_reference;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::ResourceType;

pub use manifest_io::{find_bundle, list_bundles, load_manifest};
pub use registry_items::{
    RegistryItem, find_registry_item, list_registry_items, single_resource_bundle,
    single_resource_bundle_name,
};
pub use source_reference::{DependencyEntry, SourceReference, normalize_agentskills_repo};

/// Parsed `bundle.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleManifest {
    /// Bundle name
    pub name: String,

    /// Bundle version, semver recommended
    pub version: String,

    /// Human readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Declared dependencies grouped by resource type
    #[serde(default)]
    pub dependencies: Dependencies,

    /// Inline document installed as the engine's primary instructions file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copilot_instructions: Option<InstructionsDocument>,
}

/// Dependency groups of a manifest, one ordered list per resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dependencies {
    /// Agent entries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<DependencyEntry>,
    /// Prompt entries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prompts: Vec<DependencyEntry>,
    /// Skill entries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<DependencyEntry>,
    /// Instruction entries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instructions: Vec<DependencyEntry>,
}

impl Dependencies {
    /// Entries declared for one resource type.
    #[must_use]
    pub fn of(&self, resource_type: ResourceType) -> &[DependencyEntry] {
        match resource_type {
            ResourceType::Agent => &self.agents,
            ResourceType::Prompt => &self.prompts,
            ResourceType::Skill => &self.skills,
            ResourceType::Instruction => &self.instructions,
        }
    }
}

/// Bundle-local document for the primary instructions file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InstructionsDocument {
    /// File inside the bundle directory
    #[serde(alias = "bundle")]
    Inline {
        /// Bundle-relative path
        path: String,
    },
}

impl InstructionsDocument {
    /// Bundle-relative path of the document.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Inline {
                path,
            } => path,
        }
    }
}

impl BundleManifest {
    /// All entries in processing order: agents, prompts, skills, instructions,
    /// each group in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (ResourceType, &DependencyEntry)> {
        ResourceType::ALL
            .into_iter()
            .flat_map(move |kind| self.dependencies.of(kind).iter().map(move |entry| (kind, entry)))
    }

    /// Total number of declared resources, including the primary instructions document.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.entries().count() + usize::from(self.copilot_instructions.is_some())
    }

    /// Warning text when the version is not valid semver.
    #[must_use]
    pub fn version_warning(&self) -> Option<String> {
        let trimmed = self.version.trim_start_matches('v');
        match semver::Version::parse(trimmed) {
            Ok(_) => None,
            Err(_) => Some(format!(
                "Bundle '{}' has non-semver version '{}'",
                self.name, self.version
            )),
        }
    }
}

/// A manifest together with the directory it was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedBundle {
    /// Directory containing `bundle.json`
    pub dir: PathBuf,
    /// Parsed manifest
    pub manifest: BundleManifest,
}
