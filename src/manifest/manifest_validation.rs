//! Structural checks run after a manifest parses.

use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;

use super::{BundleManifest, SourceReference};
use crate::core::{CucoError, ResourceType};
use crate::utils::path_validation::{is_safe_file_name, validate_no_traversal};

impl BundleManifest {
    /// Validates names, paths and discriminant placement.
    ///
    /// - the bundle name is a safe file name (it names the install record)
    /// - entry names are non-empty, file-name safe and unique per resource type
    /// - every relative path stays inside its root
    /// - `custom` entries name a source
    /// - `agentskills` entries only appear under `skills`
    pub fn validate(&self) -> Result<()> {
        if !is_safe_file_name(&self.name) {
            return Err(invalid(format!("bundle name '{}' is not a valid file name", self.name)));
        }
        if self.version.trim().is_empty() {
            return Err(invalid(format!("bundle '{}' has an empty version", self.name)));
        }

        for kind in ResourceType::ALL {
            let mut seen = HashSet::new();
            for entry in self.dependencies.of(kind) {
                if !is_safe_file_name(&entry.name) {
                    return Err(invalid(format!(
                        "{kind} name '{}' is empty or contains path separators",
                        entry.name
                    )));
                }
                if !seen.insert(entry.name.as_str()) {
                    return Err(invalid(format!("duplicate {kind} name '{}'", entry.name)));
                }

                if let Some(path) = entry.source.relative_path() {
                    check_relative(kind, &entry.name, path)?;
                }

                match &entry.source {
                    SourceReference::Custom {
                        source_name,
                        ..
                    } if source_name.trim().is_empty() => {
                        return Err(invalid(format!(
                            "{kind} '{}' is a custom entry without a source_name",
                            entry.name
                        )));
                    }
                    SourceReference::AgentSkills {
                        repo,
                        ..
                    } => {
                        if kind != ResourceType::Skill {
                            return Err(invalid(format!(
                                "{kind} '{}' uses type 'agentskills', which is only valid for skills",
                                entry.name
                            )));
                        }
                        if repo.trim().is_empty() || repo.split('/').count() > 2 {
                            return Err(invalid(format!(
                                "skill '{}' has an invalid repo '{repo}', expected 'owner/repo'",
                                entry.name
                            )));
                        }
                        if let Some(skill) = entry.agentskills_skill()
                            && !is_safe_file_name(skill)
                        {
                            return Err(invalid(format!(
                                "skill '{}' names an invalid skill directory '{skill}'",
                                entry.name
                            )));
                        }
                    }
                    _ => {}
                }
            }
        }

        if let Some(document) = &self.copilot_instructions {
            check_relative(ResourceType::Instruction, "copilotInstructions", document.path())?;
        }

        Ok(())
    }
}

fn check_relative(kind: ResourceType, name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(format!("{kind} '{name}' has an empty path")));
    }
    validate_no_traversal(Path::new(path))
        .map_err(|e| invalid(format!("{kind} '{name}' has an unsafe path: {e}")))
}

fn invalid(reason: String) -> anyhow::Error {
    CucoError::ManifestValidationError {
        reason,
    }
    .into()
}
