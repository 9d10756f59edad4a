//! Dependency entries and the tagged source union.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{DEFAULT_AGENTSKILLS_OWNER, DEFAULT_AGENTSKILLS_REPO};

/// Where a dependency's content comes from.
///
/// Serialized with an internal `type` tag:
///
/// ```json
/// { "name": "reviewer", "type": "reference", "source": "agents/reviewer.agent.md" }
/// { "name": "local",    "type": "inline",    "path": "agents/local.md" }
/// { "name": "review",   "type": "custom",    "source_name": "acme", "source": "skills/review" }
/// { "name": "pdf",      "type": "agentskills", "repo": "anthropics/skills" }
/// ```
///
/// `custom-copilot` is accepted as an alias of `reference` and `bundle` as an
/// alias of `inline`. Any other tag is a parse error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceReference {
    /// Path inside the local built-in registry.
    #[serde(alias = "custom-copilot")]
    Reference {
        /// Registry-relative path
        source: String,
    },

    /// Path inside the bundle's own directory.
    #[serde(alias = "bundle")]
    Inline {
        /// Bundle-relative path
        path: String,
    },

    /// Path inside a named git source, relative to its `custom_copilot/` directory.
    Custom {
        /// Registered source name
        source_name: String,
        /// Path relative to the source's marker directory
        source: String,
    },

    /// Skill from a third-party repository following the `skills/<name>/` convention.
    #[serde(rename = "agentskills")]
    AgentSkills {
        /// `owner/repo` identifier; a bare `repo` means the default owner
        #[serde(default = "default_agentskills_repo")]
        repo: String,
        /// Skill directory name; defaults to the entry name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        skill: Option<String>,
    },
}

fn default_agentskills_repo() -> String {
    DEFAULT_AGENTSKILLS_REPO.to_string()
}

impl SourceReference {
    /// Discriminant as written in manifests.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Reference {
                ..
            } => "reference",
            Self::Inline {
                ..
            } => "inline",
            Self::Custom {
                ..
            } => "custom",
            Self::AgentSkills {
                ..
            } => "agentskills",
        }
    }

    /// Relative path carried by the reference, if it has one.
    #[must_use]
    pub fn relative_path(&self) -> Option<&str> {
        match self {
            Self::Reference {
                source,
            }
            | Self::Custom {
                source,
                ..
            } => Some(source),
            Self::Inline {
                path,
            } => Some(path),
            Self::AgentSkills {
                ..
            } => None,
        }
    }
}

impl fmt::Display for SourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference {
                source,
            } => write!(f, "registry:{source}"),
            Self::Inline {
                path,
            } => write!(f, "bundle:{path}"),
            Self::Custom {
                source_name,
                source,
            } => write!(f, "{source_name}:{source}"),
            Self::AgentSkills {
                repo,
                skill,
            } => match skill {
                Some(skill) => write!(f, "{repo}#{skill}"),
                None => write!(f, "{repo}"),
            },
        }
    }
}

/// Expands an agent-skills repository identifier to `owner/repo`.
///
/// ```rust
/// use cuco_cli::manifest::normalize_agentskills_repo;
///
/// assert_eq!(normalize_agentskills_repo("skills"), "anthropics/skills");
/// assert_eq!(normalize_agentskills_repo("acme/tools"), "acme/tools");
/// ```
#[must_use]
pub fn normalize_agentskills_repo(repo: &str) -> String {
    let repo = repo.trim().trim_end_matches('/');
    if repo.contains('/') {
        repo.to_string()
    } else {
        format!("{DEFAULT_AGENTSKILLS_OWNER}/{repo}")
    }
}

/// One declared dependency: a name plus where it comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEntry {
    /// Resource name; also the installed file or directory name
    pub name: String,

    /// Origin of the content
    #[serde(flatten)]
    pub source: SourceReference,
}

impl DependencyEntry {
    /// Skill directory name for agent-skills entries.
    #[must_use]
    pub fn agentskills_skill(&self) -> Option<&str> {
        match &self.source {
            SourceReference::AgentSkills {
                skill,
                ..
            } => Some(skill.as_deref().unwrap_or(&self.name)),
            _ => None,
        }
    }
}
