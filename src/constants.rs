//! Global constants used throughout the cuco codebase.

use std::time::Duration;

/// Bundle manifest file name inside a bundle directory.
pub const MANIFEST_FILE: &str = "bundle.json";

/// Manifest every skill directory must carry at its root.
pub const SKILL_MANIFEST: &str = "SKILL.md";

/// Directory a git repository must contain to be usable as a named source.
///
/// Custom entries resolve their `source` path relative to this directory.
pub const SOURCE_MARKER_DIR: &str = "custom_copilot";

/// Directory under the registry root holding bundles addressed by name.
pub const REGISTRY_BUNDLES_DIR: &str = "bundles";

/// Directory inside a target root holding per-bundle install records.
pub const RECORD_DIR: &str = ".cuco-bundles";

/// Extension of install record files.
pub const RECORD_EXTENSION: &str = "lock";

/// Project-level configuration file name.
pub const PROJECT_CONFIG_FILE: &str = ".cuco.toml";

/// Agent-skills repository used when an entry omits `repo`.
pub const DEFAULT_AGENTSKILLS_REPO: &str = "anthropics/skills";

/// Owner prepended to agent-skills repos given without a `/`.
pub const DEFAULT_AGENTSKILLS_OWNER: &str = "anthropics";

/// Format version written into install records.
pub const RECORD_FORMAT_VERSION: u32 = 1;

/// Timeout for git clone operations.
pub const GIT_CLONE_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout for git fetch and pull operations.
pub const GIT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

