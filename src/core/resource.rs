//! Resource kinds managed by cuco
//!
//! A bundle declares dependencies grouped into four kinds. Each kind maps to a
//! directory in the target layout and has its own on-disk shape:
//!
//! - **Agents**, **prompts** and **instructions** are single files.
//! - **Skills** are directories whose root carries a `SKILL.md` manifest.
//!
//! # Examples
//!
//! ```rust
//! use cuco_cli::core::ResourceType;
//!
//! let skill: ResourceType = "skill".parse().unwrap();
//! assert_eq!(skill, ResourceType::Skill);
//! assert_eq!(skill.plural(), "skills");
//! assert!(skill.is_directory());
//!
//! let json = serde_json::to_string(&ResourceType::Prompt).unwrap();
//! assert_eq!(json, "\"prompt\"");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::CucoError;

/// Resource categories a bundle can declare.
///
/// The declaration order of variants is the processing order used by the
/// resolver and materializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// Agent definition file
    Agent,
    /// Reusable prompt file
    Prompt,
    /// Skill directory with a `SKILL.md` manifest at its root
    Skill,
    /// Instructions file
    Instruction,
}

impl ResourceType {
    /// All kinds in processing order.
    pub const ALL: [Self; 4] = [Self::Agent, Self::Prompt, Self::Skill, Self::Instruction];

    /// Plural name used for manifest keys and target subdirectories.
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Agent => "agents",
            Self::Prompt => "prompts",
            Self::Skill => "skills",
            Self::Instruction => "instructions",
        }
    }

    /// Whether resources of this kind are directories rather than single files.
    #[must_use]
    pub const fn is_directory(self) -> bool {
        matches!(self, Self::Skill)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Agent => "agent",
            Self::Prompt => "prompt",
            Self::Skill => "skill",
            Self::Instruction => "instruction",
        };
        f.write_str(name)
    }
}

impl FromStr for ResourceType {
    type Err = CucoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "agent" | "agents" => Ok(Self::Agent),
            "prompt" | "prompts" => Ok(Self::Prompt),
            "skill" | "skills" => Ok(Self::Skill),
            "instruction" | "instructions" => Ok(Self::Instruction),
            _ => Err(CucoError::InvalidResourceType {
                resource_type: s.to_string(),
            }),
        }
    }
}
