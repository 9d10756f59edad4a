//! Named source configuration and user-wide paths.
//!
//! Two scopes hold `name -> git URL` tables:
//!
//! - **project**: `<project>/.cuco.toml`
//! - **global**: `~/.cuco/config.toml` (or `CUCO_CONFIG`)
//!
//! Lookups consult the project scope first, so a project can shadow a global
//! source of the same name. Everything is loaded once into a [`SourceConfig`]
//! at the start of a command and passed explicitly to whatever needs it; nothing
//! re-reads configuration mid-operation.
//!
//! # Paths
//!
//! | setting | env override | config key | default |
//! |---|---|---|---|
//! | global config | `CUCO_CONFIG` | | `~/.cuco/config.toml` |
//! | cache directory | `CUCO_CACHE_DIR` | `cache_dir` | `~/.cuco/cache` |
//! | registry | `CUCO_REGISTRY` | `registry` | `~/.cuco/registry` |
//!
//! # Examples
//!
//! ```rust,no_run
//! use cuco_cli::config::{ConfigOverrides, SourceConfig, SourceScope};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut config = SourceConfig::load(Path::new("."), &ConfigOverrides::from_env()).await?;
//! config.register("acme", "https://github.com/acme/resources.git", SourceScope::Project, false)?;
//! config.save(SourceScope::Project).await?;
//!
//! let (url, scope) = config.lookup("acme").unwrap();
//! println!("{url} from {scope}");
//! # Ok(())
//! # }
//! ```

mod global;
mod project;

use anyhow::Result;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants::PROJECT_CONFIG_FILE;
use crate::core::CucoError;
use crate::utils::platform::resolve_path;

pub use global::{GlobalConfig, cuco_home};
pub use project::ProjectConfig;

/// Where a named source is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceScope {
    /// `<project>/.cuco.toml`
    Project,
    /// `~/.cuco/config.toml`
    Global,
}

impl fmt::Display for SourceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Project => "project",
            Self::Global => "global",
        })
    }
}

/// A registered source as listed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSource {
    /// Source name
    pub name: String,
    /// Git URL
    pub url: String,
    /// Scope it is registered in
    pub scope: SourceScope,
    /// Whether a project entry of the same name hides this one
    pub shadowed: bool,
}

/// Result of [`SourceConfig::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The name was new in the scope
    Added,
    /// The name existed with another URL and was replaced (forced)
    Replaced {
        /// URL that was replaced
        previous: String,
    },
    /// The name already pointed to the same URL
    Unchanged,
}

/// Explicit path overrides, usually taken from the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Global config file location
    pub global_config: Option<PathBuf>,
    /// Cache directory
    pub cache_dir: Option<PathBuf>,
    /// Registry root
    pub registry: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Reads `CUCO_CONFIG`, `CUCO_CACHE_DIR` and `CUCO_REGISTRY`.
    #[must_use]
    pub fn from_env() -> Self {
        let path_var = |name: &str| {
            std::env::var(name).ok().filter(|v| !v.trim().is_empty()).map(PathBuf::from)
        };
        Self {
            global_config: path_var("CUCO_CONFIG"),
            cache_dir: path_var("CUCO_CACHE_DIR"),
            registry: path_var("CUCO_REGISTRY"),
        }
    }
}

/// Both source scopes plus the resolved user-wide paths.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    global: GlobalConfig,
    global_path: PathBuf,
    project: ProjectConfig,
    project_path: PathBuf,
    cache_dir: PathBuf,
    registry: PathBuf,
}

impl SourceConfig {
    /// Loads both scopes and resolves the cache and registry paths.
    pub async fn load(project_root: &Path, overrides: &ConfigOverrides) -> Result<Self> {
        let global_path = match &overrides.global_config {
            Some(path) => path.clone(),
            None => GlobalConfig::default_path()?,
        };
        let project_path = project_root.join(PROJECT_CONFIG_FILE);

        let global = GlobalConfig::load_or_default(&global_path).await?;
        let project = ProjectConfig::load_or_default(&project_path).await?;

        let cache_dir = match (&overrides.cache_dir, &global.cache_dir) {
            (Some(dir), _) => dir.clone(),
            (None, Some(configured)) => resolve_path(configured)?,
            (None, None) => cuco_home()?.join("cache"),
        };
        let registry = match (&overrides.registry, &global.registry) {
            (Some(dir), _) => dir.clone(),
            (None, Some(configured)) => resolve_path(configured)?,
            (None, None) => cuco_home()?.join("registry"),
        };

        debug!(
            "Loaded configuration: {} global and {} project sources, cache {}, registry {}",
            global.sources.len(),
            project.sources.len(),
            cache_dir.display(),
            registry.display()
        );

        Ok(Self {
            global,
            global_path,
            project,
            project_path,
            cache_dir,
            registry,
        })
    }

    /// Cache directory for cloned sources.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Root of the built-in registry.
    #[must_use]
    pub fn registry_dir(&self) -> &Path {
        &self.registry
    }

    /// Path of the file backing a scope.
    #[must_use]
    pub fn path_of(&self, scope: SourceScope) -> &Path {
        match scope {
            SourceScope::Project => &self.project_path,
            SourceScope::Global => &self.global_path,
        }
    }

    fn table(&self, scope: SourceScope) -> &std::collections::BTreeMap<String, String> {
        match scope {
            SourceScope::Project => &self.project.sources,
            SourceScope::Global => &self.global.sources,
        }
    }

    fn table_mut(&mut self, scope: SourceScope) -> &mut std::collections::BTreeMap<String, String> {
        match scope {
            SourceScope::Project => &mut self.project.sources,
            SourceScope::Global => &mut self.global.sources,
        }
    }

    /// URL and scope for a name; project scope first.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<(&str, SourceScope)> {
        [SourceScope::Project, SourceScope::Global]
            .into_iter()
            .find_map(|scope| self.table(scope).get(name).map(|url| (url.as_str(), scope)))
    }

    /// Like [`lookup`](Self::lookup) but unknown names are a configuration error.
    pub fn require(&self, name: &str) -> Result<&str> {
        self.lookup(name).map(|(url, _)| url).ok_or_else(|| {
            CucoError::SourceNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Adds or replaces a named source in memory.
    ///
    /// Fails with [`CucoError::SourceAlreadyExists`] when the name maps to a
    /// different URL in the same scope and `force` is not set. Call
    /// [`save`](Self::save) to persist.
    pub fn register(
        &mut self,
        name: &str,
        url: &str,
        scope: SourceScope,
        force: bool,
    ) -> Result<RegisterOutcome> {
        let name = name.trim();
        let url = url.trim();
        if name.is_empty() || url.is_empty() {
            return Err(CucoError::ConfigError {
                message: "source name and URL must not be empty".to_string(),
            }
            .into());
        }
        if !looks_like_git_url(url) {
            warn!("Source '{name}' URL '{url}' does not look like a git remote");
        }

        let table = self.table_mut(scope);
        let outcome = match table.get(name) {
            Some(existing) if existing == url => RegisterOutcome::Unchanged,
            Some(existing) if !force => {
                return Err(CucoError::SourceAlreadyExists {
                    name: name.to_string(),
                    scope: scope.to_string(),
                    existing_url: existing.clone(),
                }
                .into());
            }
            Some(existing) => RegisterOutcome::Replaced {
                previous: existing.clone(),
            },
            None => RegisterOutcome::Added,
        };
        table.insert(name.to_string(), url.to_string());
        Ok(outcome)
    }

    /// Removes a named source from one scope. Returns the removed URL.
    pub fn remove(&mut self, name: &str, scope: SourceScope) -> Result<String> {
        self.table_mut(scope).remove(name).ok_or_else(|| {
            CucoError::SourceNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Every registered source, project scope first, each scope sorted by name.
    #[must_use]
    pub fn list(&self) -> Vec<NamedSource> {
        let mut sources: Vec<NamedSource> = self
            .project
            .sources
            .iter()
            .map(|(name, url)| NamedSource {
                name: name.clone(),
                url: url.clone(),
                scope: SourceScope::Project,
                shadowed: false,
            })
            .collect();
        sources.extend(self.global.sources.iter().map(|(name, url)| NamedSource {
            name: name.clone(),
            url: url.clone(),
            scope: SourceScope::Global,
            shadowed: self.project.sources.contains_key(name),
        }));
        sources
    }

    /// Persists one scope to its file.
    pub async fn save(&self, scope: SourceScope) -> Result<()> {
        match scope {
            SourceScope::Project => self.project.save_to(&self.project_path).await,
            SourceScope::Global => self.global.save_to(&self.global_path).await,
        }
    }
}

/// Heuristic check for git remote syntax.
///
/// Accepts `https://`, `http://`, `ssh://`, `git://`, `file://`, scp-like
/// `user@host:path` and existing local directories.
#[must_use]
pub fn looks_like_git_url(url: &str) -> bool {
    const SCHEMES: [&str; 5] = ["https://", "http://", "ssh://", "git://", "file://"];
    if SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
        return true;
    }
    if let Some((user_host, path)) = url.split_once(':')
        && user_host.contains('@')
        && !path.is_empty()
        && !user_host.contains('/')
    {
        return true;
    }
    Path::new(url).is_dir()
}
