//! Target engine detection and install layouts.
//!
//! A project integrates with one assistant through a marker directory at its
//! root. Detection checks markers in a fixed priority order and picks the first
//! one present:
//!
//! | priority | engine | marker |
//! |---|---|---|
//! | 1 | [`TargetEngine::Github`] | `.github/` |
//! | 2 | [`TargetEngine::Claude`] | `.claude/` |
//! | 3 | [`TargetEngine::Cuco`] | `.cuco/` |
//!
//! With no marker present the primary convention (`.github`) is returned.
//! Detection never creates anything; [`initialize`] is the explicit step that does.
//!
//! Each engine maps a resource type and name to a destination through
//! [`TargetLayout::destination`]. The materializer and the sync engine both go
//! through that function, so they always agree on where a resource lives.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::core::{CucoError, ResourceType};
use crate::utils::fs::ensure_dir;

/// Supported integration conventions, in detection priority order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetEngine {
    /// GitHub Copilot, `.github/`
    #[default]
    Github,
    /// Claude Code, `.claude/`
    Claude,
    /// Tool-agnostic layout, `.cuco/`
    Cuco,
}

impl TargetEngine {
    /// Engines in detection priority order.
    pub const PRIORITY: [Self; 3] = [Self::Github, Self::Claude, Self::Cuco];

    /// Marker directory name at the project root.
    #[must_use]
    pub const fn folder(self) -> &'static str {
        match self {
            Self::Github => ".github",
            Self::Claude => ".claude",
            Self::Cuco => ".cuco",
        }
    }

    /// Layout of this engine.
    #[must_use]
    pub const fn layout(self) -> TargetLayout {
        TargetLayout {
            engine: self,
        }
    }
}

impl fmt::Display for TargetEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Github => "github",
            Self::Claude => "claude",
            Self::Cuco => "cuco",
        })
    }
}

impl FromStr for TargetEngine {
    type Err = CucoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "github" | "copilot" | ".github" => Ok(Self::Github),
            "claude" | ".claude" => Ok(Self::Claude),
            "cuco" | ".cuco" => Ok(Self::Cuco),
            _ => Err(CucoError::UnknownEngine {
                engine: s.to_string(),
            }),
        }
    }
}

/// Fixed mapping from resource type and name to a path under the target root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetLayout {
    engine: TargetEngine,
}

impl TargetLayout {
    /// Engine this layout belongs to.
    #[must_use]
    pub const fn engine(&self) -> TargetEngine {
        self.engine
    }

    /// Subdirectory for a resource type.
    #[must_use]
    pub const fn subdir(&self, resource_type: ResourceType) -> &'static str {
        match (self.engine, resource_type) {
            (TargetEngine::Claude, ResourceType::Prompt) => "commands",
            (_, kind) => kind.plural(),
        }
    }

    /// File suffix for single-file resource types; empty for directories.
    #[must_use]
    pub const fn suffix(&self, resource_type: ResourceType) -> &'static str {
        match (self.engine, resource_type) {
            (_, ResourceType::Skill) => "",
            (TargetEngine::Claude, _) => ".md",
            (_, ResourceType::Agent) => ".agent.md",
            (_, ResourceType::Prompt) => ".prompt.md",
            (_, ResourceType::Instruction) => ".instructions.md",
        }
    }

    /// Destination relative to the target root.
    ///
    /// ```rust
    /// use cuco_cli::core::ResourceType;
    /// use cuco_cli::target::TargetEngine;
    /// use std::path::PathBuf;
    ///
    /// let layout = TargetEngine::Github.layout();
    /// assert_eq!(
    ///     layout.destination(ResourceType::Agent, "reviewer"),
    ///     PathBuf::from("agents/reviewer.agent.md")
    /// );
    /// assert_eq!(layout.destination(ResourceType::Skill, "review"), PathBuf::from("skills/review"));
    /// ```
    #[must_use]
    pub fn destination(&self, resource_type: ResourceType, name: &str) -> PathBuf {
        let file_name = format!("{name}{}", self.suffix(resource_type));
        Path::new(self.subdir(resource_type)).join(file_name)
    }

    /// Primary instructions file relative to the target root.
    #[must_use]
    pub fn primary_instructions(&self) -> PathBuf {
        PathBuf::from(match self.engine {
            TargetEngine::Github => "copilot-instructions.md",
            TargetEngine::Claude => "CLAUDE.md",
            TargetEngine::Cuco => "instructions.md",
        })
    }
}

/// Result of engine detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedTarget {
    /// Selected engine
    pub engine: TargetEngine,
    /// Absolute path of the engine folder
    pub root: PathBuf,
    /// Layout used for destinations
    pub layout: TargetLayout,
    /// Whether the engine folder already exists
    pub exists: bool,
}

impl DetectedTarget {
    /// Target for a specific engine, regardless of markers.
    #[must_use]
    pub fn for_engine(project_root: &Path, engine: TargetEngine) -> Self {
        let root = project_root.join(engine.folder());
        Self {
            engine,
            exists: root.is_dir(),
            root,
            layout: engine.layout(),
        }
    }
}

/// Detects the active engine for a project. Read-only.
#[must_use]
pub fn detect(project_root: &Path) -> DetectedTarget {
    for engine in TargetEngine::PRIORITY {
        if project_root.join(engine.folder()).is_dir() {
            debug!("Detected target engine '{engine}' in {}", project_root.display());
            return DetectedTarget::for_engine(project_root, engine);
        }
    }
    debug!("No target marker in {}, defaulting to '{}'", project_root.display(), TargetEngine::default());
    DetectedTarget::for_engine(project_root, TargetEngine::default())
}

/// Detection, unless an engine is forced.
#[must_use]
pub fn select(project_root: &Path, forced: Option<TargetEngine>) -> DetectedTarget {
    match forced {
        Some(engine) => DetectedTarget::for_engine(project_root, engine),
        None => detect(project_root),
    }
}

/// Creates the engine folder and one subdirectory per resource type.
///
/// Returns the directories that did not exist before.
pub fn initialize(project_root: &Path, engine: TargetEngine) -> Result<Vec<PathBuf>> {
    let target = DetectedTarget::for_engine(project_root, engine);
    let mut created = Vec::new();

    let mut dirs = vec![target.root.clone()];
    dirs.extend(ResourceType::ALL.iter().map(|kind| target.root.join(target.layout.subdir(*kind))));

    for dir in dirs {
        if !dir.is_dir() {
            ensure_dir(&dir)?;
            created.push(dir);
        }
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_detect_defaults_without_creating() {
        let temp = TempDir::new().unwrap();
        let detected = detect(temp.path());
        assert_eq!(detected.engine, TargetEngine::Github);
        assert!(!detected.exists);
        assert!(!temp.path().join(".github").exists());
    }

    #[test]
    fn test_detect_priority_is_deterministic() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".cuco")).unwrap();
        assert_eq!(detect(temp.path()).engine, TargetEngine::Cuco);

        fs::create_dir(temp.path().join(".claude")).unwrap();
        assert_eq!(detect(temp.path()).engine, TargetEngine::Claude);

        fs::create_dir(temp.path().join(".github")).unwrap();
        let detected = detect(temp.path());
        assert_eq!(detected.engine, TargetEngine::Github);
        assert_eq!(detected.root, temp.path().join(".github"));
        assert!(detected.exists);
    }

    #[test]
    fn test_marker_must_be_a_directory() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".github"), "not a dir").unwrap();
        fs::create_dir(temp.path().join(".claude")).unwrap();
        assert_eq!(detect(temp.path()).engine, TargetEngine::Claude);
    }

    #[test]
    fn test_layout_destinations() {
        let claude = TargetEngine::Claude.layout();
        assert_eq!(claude.destination(ResourceType::Prompt, "commit"), PathBuf::from("commands/commit.md"));
        assert_eq!(claude.destination(ResourceType::Agent, "a"), PathBuf::from("agents/a.md"));
        assert_eq!(claude.primary_instructions(), PathBuf::from("CLAUDE.md"));

        let github = TargetEngine::Github.layout();
        assert_eq!(
            github.destination(ResourceType::Instruction, "rust"),
            PathBuf::from("instructions/rust.instructions.md")
        );
        assert_eq!(github.primary_instructions(), PathBuf::from("copilot-instructions.md"));
    }

    #[test]
    fn test_select_forced_engine() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".github")).unwrap();
        let selected = select(temp.path(), Some(TargetEngine::Claude));
        assert_eq!(selected.engine, TargetEngine::Claude);
        assert!(!selected.exists);
    }

    #[test]
    fn test_initialize_creates_layout() {
        let temp = TempDir::new().unwrap();
        let created = initialize(temp.path(), TargetEngine::Claude).unwrap();
        assert_eq!(created.len(), 5);
        assert!(temp.path().join(".claude/commands").is_dir());
        assert!(temp.path().join(".claude/skills").is_dir());

        assert!(initialize(temp.path(), TargetEngine::Claude).unwrap().is_empty());
    }

    #[test]
    fn test_engine_from_str() {
        assert_eq!("GitHub".parse::<TargetEngine>().unwrap(), TargetEngine::Github);
        assert_eq!(".claude".parse::<TargetEngine>().unwrap(), TargetEngine::Claude);
        assert!("vscode".parse::<TargetEngine>().is_err());
    }
}
