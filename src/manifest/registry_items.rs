//! Single resources in the registry and the one-entry bundles built from them.
//!
//! Registry resources live under `<registry>/<type plural>/`. Skills are
//! directories carrying a `SKILL.md`; the other types are files named
//! `<name>.md`, `<name>.agent.md`, `<name>.prompt.md` or
//! `<name>.instructions.md`, looked up in that order.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use super::{BundleManifest, DependencyEntry, Dependencies, LoadedBundle, SourceReference};
use crate::constants::SKILL_MANIFEST;
use crate::core::{CucoError, ResourceType};
use crate::utils::path_validation::is_safe_file_name;

/// File suffixes of single-file registry resources, in lookup order.
const FILE_SUFFIXES: [&str; 4] = [".md", ".agent.md", ".prompt.md", ".instructions.md"];

/// Version given to bundles built by [`single_resource_bundle`].
const SINGLE_RESOURCE_VERSION: &str = "0.0.0";

/// A resource found in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryItem {
    /// Resource name
    pub name: String,
    /// Resource type
    pub resource_type: ResourceType,
    /// Registry-relative path, `/`-separated
    pub path: String,
}

/// Lists the registry's resources of one type, sorted by name.
///
/// A missing type directory yields an empty list.
pub fn list_registry_items(registry: &Path, resource_type: ResourceType) -> Result<Vec<RegistryItem>> {
    let dir = registry.join(resource_type.plural());
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", dir.display())),
    };

    let mut names = BTreeSet::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.starts_with('.') || !is_safe_file_name(&file_name) {
            continue;
        }
        let path = entry.path();
        if resource_type.is_directory() {
            if path.join(SKILL_MANIFEST).is_file() {
                names.insert(file_name);
            }
        } else if path.is_file()
            && let Some(name) = strip_file_suffix(&file_name)
        {
            names.insert(name.to_string());
        }
    }

    names
        .into_iter()
        .map(|name| find_registry_item(registry, resource_type, &name))
        .collect()
}

/// Finds one resource by type and name.
pub fn find_registry_item(registry: &Path, resource_type: ResourceType, name: &str) -> Result<RegistryItem> {
    if !is_safe_file_name(name) {
        return Err(CucoError::ManifestValidationError {
            reason: format!("{resource_type} name '{name}' is not a valid file name"),
        }
        .into());
    }

    let plural = resource_type.plural();
    let candidates: Vec<String> = if resource_type.is_directory() {
        vec![format!("{plural}/{name}")]
    } else {
        FILE_SUFFIXES.iter().map(|suffix| format!("{plural}/{name}{suffix}")).collect()
    };

    let found = candidates.into_iter().find(|candidate| {
        let path = registry.join(candidate);
        if resource_type.is_directory() { path.is_dir() } else { path.is_file() }
    });

    match found {
        Some(path) => Ok(RegistryItem {
            name: name.to_string(),
            resource_type,
            path,
        }),
        None => {
            let available = list_registry_items(registry, resource_type)
                .map(|items| items.into_iter().map(|item| item.name).collect())
                .unwrap_or_default();
            Err(CucoError::RegistryItemNotFound {
                resource_type: resource_type.to_string(),
                name: name.to_string(),
                available,
            }
            .into())
        }
    }
}

/// Record name used for a resource added on its own, e.g. `agent.reviewer`.
#[must_use]
pub fn single_resource_bundle_name(resource_type: ResourceType, name: &str) -> String {
    format!("{resource_type}.{name}")
}

/// One-entry bundle installing `item` through a registry reference.
///
/// The bundle is validated like a manifest loaded from disk.
pub fn single_resource_bundle(registry: &Path, item: &RegistryItem) -> Result<LoadedBundle> {
    let entry = DependencyEntry {
        name: item.name.clone(),
        source: SourceReference::Reference {
            source: item.path.clone(),
        },
    };
    let mut dependencies = Dependencies::default();
    match item.resource_type {
        ResourceType::Agent => dependencies.agents.push(entry),
        ResourceType::Prompt => dependencies.prompts.push(entry),
        ResourceType::Skill => dependencies.skills.push(entry),
        ResourceType::Instruction => dependencies.instructions.push(entry),
    }

    let manifest = BundleManifest {
        name: single_resource_bundle_name(item.resource_type, &item.name),
        version: SINGLE_RESOURCE_VERSION.to_string(),
        description: None,
        dependencies,
        copilot_instructions: None,
    };
    manifest.validate()?;

    Ok(LoadedBundle {
        dir: registry.to_path_buf(),
        manifest,
    })
}

fn strip_file_suffix(file_name: &str) -> Option<&str> {
    FILE_SUFFIXES
        .iter()
        .rev()
        .find_map(|suffix| file_name.strip_suffix(suffix))
        .filter(|name| !name.is_empty())
}
