//! Bundle resolution: from declared dependencies to concrete content paths.
//!
//! [`resolve`] walks a manifest in declaration order (agents, prompts, skills,
//! instructions, then the primary instructions document) and maps each entry
//! to an absolute source path:
//!
//! | reference | resolved against |
//! |---|---|
//! | `reference` | the local registry root |
//! | `inline` | the bundle directory |
//! | `custom` | `custom_copilot/` in the named source checkout |
//! | `agentskills` | `skills/<skill>/` in the repository checkout |
//!
//! Resolution is fail-fast: the first entry that cannot be resolved aborts the
//! whole bundle, with context naming the entry. A bundle is never partially
//! resolved.
//!
//! Resolved paths are checked for shape as well as existence. Skills must be
//! directories containing `SKILL.md`; every other type must be a single file.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::constants::SKILL_MANIFEST;
use crate::core::{CucoError, ResourceType};
use crate::manifest::{DependencyEntry, LoadedBundle, SourceReference};
use crate::source::SourceManager;
use crate::target::TargetLayout;
use crate::utils::path_validation::validate_no_traversal;

/// Record name of the bundle's primary instructions document.
pub const PRIMARY_INSTRUCTIONS_NAME: &str = "copilot-instructions";

/// Where a resolved resource lands in the target layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Per-type subdirectory, named after the resource
    Typed,
    /// The engine's primary instructions file
    PrimaryInstructions,
}

/// A dependency resolved to content on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    /// Resource name
    pub name: String,
    /// Resource type
    pub resource_type: ResourceType,
    /// Declared origin
    pub origin: SourceReference,
    /// Absolute path of the file or skill directory
    pub source_path: PathBuf,
    /// Destination kind
    pub placement: Placement,
}

impl ResolvedResource {
    /// Destination relative to the target root.
    #[must_use]
    pub fn destination(&self, layout: &TargetLayout) -> PathBuf {
        match self.placement {
            Placement::Typed => layout.destination(self.resource_type, &self.name),
            Placement::PrimaryInstructions => layout.primary_instructions(),
        }
    }

    /// Whether the content is a directory tree.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        self.resource_type.is_directory() && matches!(self.placement, Placement::Typed)
    }
}

/// Outcome of resolving one bundle.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Bundle name
    pub bundle: String,
    /// Bundle version
    pub bundle_version: String,
    /// Resources in declaration order
    pub resources: Vec<ResolvedResource>,
    /// Recoverable problems, e.g. sources served from a stale cache
    pub warnings: Vec<String>,
}

/// Resolves every dependency of `bundle`.
///
/// `Reference` entries resolve against the registry configured in `sources`.
pub async fn resolve(bundle: &LoadedBundle, sources: &mut SourceManager) -> Result<Resolution> {
    let manifest = &bundle.manifest;
    let registry = sources.config().registry_dir().to_path_buf();
    info!(
        "Resolving bundle '{}' ({} resources)",
        manifest.name,
        manifest.resource_count()
    );

    let mut resolution = Resolution {
        bundle: manifest.name.clone(),
        bundle_version: manifest.version.clone(),
        ..Resolution::default()
    };
    if let Some(warning) = manifest.version_warning() {
        warn!("{warning}");
        resolution.warnings.push(warning);
    }

    for (resource_type, entry) in manifest.entries() {
        let source_path = resolve_entry(resource_type, entry, bundle, &registry, sources)
            .await
            .with_context(|| {
                format!(
                    "Failed to resolve {resource_type} '{}' ({}) in bundle '{}'",
                    entry.name, entry.source, manifest.name
                )
            })?;
        debug!("Resolved {resource_type} '{}' to {}", entry.name, source_path.display());
        resolution.resources.push(ResolvedResource {
            name: entry.name.clone(),
            resource_type,
            origin: entry.source.clone(),
            source_path,
            placement: Placement::Typed,
        });
    }

    if let Some(document) = &manifest.copilot_instructions {
        let origin = SourceReference::Inline {
            path: document.path().to_string(),
        };
        let source_path = resolve_local(&bundle.dir, document.path(), "bundle directory")
            .and_then(|path| require_file(ResourceType::Instruction, PRIMARY_INSTRUCTIONS_NAME, path))
            .with_context(|| {
                format!(
                    "Failed to resolve copilotInstructions ({origin}) in bundle '{}'",
                    manifest.name
                )
            })?;
        resolution.resources.push(ResolvedResource {
            name: PRIMARY_INSTRUCTIONS_NAME.to_string(),
            resource_type: ResourceType::Instruction,
            origin,
            source_path,
            placement: Placement::PrimaryInstructions,
        });
    }

    resolution.warnings.extend(sources.take_warnings());
    Ok(resolution)
}

async fn resolve_entry(
    resource_type: ResourceType,
    entry: &DependencyEntry,
    bundle: &LoadedBundle,
    registry: &Path,
    sources: &mut SourceManager,
) -> Result<PathBuf> {
    let path = match &entry.source {
        SourceReference::Reference {
            source,
        } => resolve_local(registry, source, "registry")?,
        SourceReference::Inline {
            path,
        } => resolve_local(&bundle.dir, path, "bundle directory")?,
        SourceReference::Custom {
            source_name,
            source,
        } => sources.locate(source_name, source).await?,
        SourceReference::AgentSkills {
            repo,
            ..
        } => {
            let skill = entry.agentskills_skill().unwrap_or(&entry.name);
            sources.locate_agentskill(repo, skill).await?
        }
    };

    if resource_type.is_directory() {
        require_skill_dir(&entry.name, path)
    } else {
        require_file(resource_type, &entry.name, path)
    }
}

fn resolve_local(root: &Path, relative: &str, label: &str) -> Result<PathBuf> {
    validate_no_traversal(Path::new(relative))?;
    let path = root.join(relative);
    if !path.exists() {
        return Err(CucoError::ResourceFileNotFound {
            path: relative.to_string(),
            source_name: format!("{label} {}", root.display()),
        }
        .into());
    }
    Ok(path)
}

fn require_file(resource_type: ResourceType, name: &str, path: PathBuf) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(CucoError::InvalidDependency {
            resource_type: resource_type.to_string(),
            name: name.to_string(),
            reason: format!("{} is not a file", path.display()),
        }
        .into())
    }
}

fn require_skill_dir(name: &str, path: PathBuf) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(CucoError::InvalidDependency {
            resource_type: ResourceType::Skill.to_string(),
            name: name.to_string(),
            reason: format!("{} is not a directory", path.display()),
        }
        .into());
    }
    if !path.join(SKILL_MANIFEST).is_file() {
        return Err(CucoError::InvalidDependency {
            resource_type: ResourceType::Skill.to_string(),
            name: name.to_string(),
            reason: format!("{} has no {SKILL_MANIFEST}", path.display()),
        }
        .into());
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigOverrides, SourceConfig, SourceScope};
    use crate::manifest::load_manifest;
    use crate::target::TargetEngine;
    use crate::test_utils::{RegistryFixture, SourceRepoFixture};
    use tempfile::TempDir;

    struct Env {
        temp: TempDir,
        registry: RegistryFixture,
    }

    impl Env {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let registry = RegistryFixture::create(&temp.path().join("registry")).unwrap();
            Self {
                temp,
                registry,
            }
        }

        async fn manager(&self) -> SourceManager {
            SourceManager::new(self.config().await)
        }

        async fn config(&self) -> SourceConfig {
            let overrides = ConfigOverrides {
                global_config: Some(self.temp.path().join("home/config.toml")),
                cache_dir: Some(self.temp.path().join("cache")),
                registry: Some(self.registry.path().to_path_buf()),
            };
            let project = self.temp.path().join("project");
            std::fs::create_dir_all(&project).unwrap();
            SourceConfig::load(&project, &overrides).await.unwrap()
        }

        fn bundle(&self, json: &str) -> LoadedBundle {
            let dir = self.registry.bundle("team", json).unwrap();
            load_manifest(&dir).unwrap()
        }
    }

    #[tokio::test]
    async fn test_resolves_in_declaration_order() {
        let env = Env::new();
        env.registry.write("agents/reviewer.agent.md", "# Reviewer").unwrap();
        env.registry.write("bundles/team/prompts/local.md", "local").unwrap();
        env.registry.write("bundles/team/skills/notes/SKILL.md", "notes").unwrap();
        env.registry.write("bundles/team/main.md", "main").unwrap();
        let bundle = env.bundle(
            r#"{
                "name": "team",
                "version": "1.0.0",
                "dependencies": {
                    "skills": [{"name": "notes", "type": "inline", "path": "skills/notes"}],
                    "prompts": [{"name": "local", "type": "bundle", "path": "prompts/local.md"}],
                    "agents": [{"name": "reviewer", "type": "reference", "source": "agents/reviewer.agent.md"}]
                },
                "copilotInstructions": {"type": "inline", "path": "main.md"}
            }"#,
        );

        let mut manager = env.manager().await;
        let resolution = resolve(&bundle, &mut manager).await.unwrap();
        let names: Vec<_> = resolution.resources.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["reviewer", "local", "notes", PRIMARY_INSTRUCTIONS_NAME]);
        assert!(resolution.warnings.is_empty());

        let layout = TargetEngine::Claude.layout();
        let destinations: Vec<_> =
            resolution.resources.iter().map(|r| r.destination(&layout)).collect();
        assert_eq!(
            destinations,
            vec![
                PathBuf::from("agents/reviewer.md"),
                PathBuf::from("commands/local.md"),
                PathBuf::from("skills/notes"),
                PathBuf::from("CLAUDE.md"),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_reference_fails_whole_bundle() {
        let env = Env::new();
        env.registry.write("agents/a.md", "a").unwrap();
        let bundle = env.bundle(
            r#"{
                "name": "team",
                "version": "1.0.0",
                "dependencies": {
                    "agents": [
                        {"name": "a", "type": "reference", "source": "agents/a.md"},
                        {"name": "b", "type": "reference", "source": "agents/typo.md"}
                    ]
                }
            }"#,
        );

        let mut manager = env.manager().await;
        let err = resolve(&bundle, &mut manager).await.unwrap_err();
        assert!(format!("{err:#}").contains("agent 'b'"));
        assert!(matches!(
            err.downcast_ref::<CucoError>(),
            Some(CucoError::ResourceFileNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_skill_without_manifest_is_rejected() {
        let env = Env::new();
        env.registry.write("skills/broken/README.md", "no manifest").unwrap();
        let bundle = env.bundle(
            r#"{
                "name": "team",
                "version": "1.0.0",
                "dependencies": {
                    "skills": [{"name": "broken", "type": "reference", "source": "skills/broken"}]
                }
            }"#,
        );

        let mut manager = env.manager().await;
        let err = resolve(&bundle, &mut manager).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CucoError>(),
            Some(CucoError::InvalidDependency { .. })
        ));
    }

    #[tokio::test]
    async fn test_custom_reference_through_named_source() {
        let env = Env::new();
        let upstream = SourceRepoFixture::create(&env.temp.path().join("acme")).unwrap();
        upstream.write("skills/review/SKILL.md", "# Review").unwrap().commit("init").unwrap();

        let mut config = env.config().await;
        config.register("acme", &upstream.url(), SourceScope::Project, false).unwrap();
        let mut manager = SourceManager::new(config);

        let bundle = env.bundle(
            r#"{
                "name": "team",
                "version": "next",
                "dependencies": {
                    "skills": [{"name": "review", "type": "custom", "source_name": "acme", "source": "skills/review"}]
                }
            }"#,
        );
        let resolution = resolve(&bundle, &mut manager).await.unwrap();
        assert_eq!(resolution.resources.len(), 1);
        assert!(resolution.resources[0].is_directory());
        assert!(resolution.resources[0].source_path.join("SKILL.md").is_file());
        // Non-semver version is accepted with a warning.
        assert_eq!(resolution.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_source_is_configuration_error() {
        let env = Env::new();
        let bundle = env.bundle(
            r#"{
                "name": "team",
                "version": "1.0.0",
                "dependencies": {
                    "skills": [{"name": "review", "type": "custom", "source_name": "nobody", "source": "skills/review"}]
                }
            }"#,
        );
        let mut manager = env.manager().await;
        let err = resolve(&bundle, &mut manager).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<CucoError>(), Some(CucoError::SourceNotFound { .. })));
    }
}
