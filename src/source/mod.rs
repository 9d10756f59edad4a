//! Named source resolution and caching.
//!
//! A named source is a git repository registered under a name (see
//! [`crate::config`]). [`SourceManager`] turns a name into a local checkout:
//!
//! 1. Look up the URL, project scope first. Unknown names are a
//!    [`CucoError::SourceNotFound`] configuration error.
//! 2. Under the per-source [`CacheLock`], inspect the cache entry. A checkout that
//!    is not a healthy repository, or was cloned from a different URL, is removed.
//! 3. No usable checkout: clone. A failed first clone is fatal
//!    ([`CucoError::SourceUnavailable`]) and leaves nothing behind.
//! 4. Usable checkout: fast-forward it. A failed refresh is recoverable; the stale
//!    checkout is used and a warning is recorded for the operation's report.
//!
//! Each source is resolved at most once per [`SourceManager`], so one command sees
//! a single consistent snapshot of every source it touches.
//!
//! # Layout convention
//!
//! Named sources keep their resources under a `custom_copilot/` directory at the
//! repository root. [`SourceManager::locate`] checks for it and distinguishes a
//! repository with the wrong layout from one that could not be fetched.
//! Agent-skills repositories instead follow `skills/<name>/SKILL.md`.

use anyhow::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheLock, CacheMetadata};
use crate::config::SourceConfig;
use crate::constants::{SKILL_MANIFEST, SOURCE_MARKER_DIR};
use crate::core::CucoError;
use crate::git::{GitRepo, ensure_git_available, strip_auth_from_url};
use crate::manifest::normalize_agentskills_repo;
use crate::utils::fs::{ensure_dir, remove_path};
use crate::utils::path_validation::validate_no_traversal;

/// A source checkout ready to read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// Source name or agent-skills identifier
    pub name: String,
    /// URL the checkout tracks
    pub url: String,
    /// Checkout root
    pub root: PathBuf,
    /// Whether the checkout was refreshed during this resolution
    pub fresh: bool,
}

/// Resolves named sources and agent-skills repositories to local checkouts.
pub struct SourceManager {
    config: SourceConfig,
    cache_dir: PathBuf,
    resolved: HashMap<String, ResolvedSource>,
    warnings: Vec<String>,
}

impl SourceManager {
    /// Manager using the cache directory configured in `config`.
    #[must_use]
    pub fn new(config: SourceConfig) -> Self {
        let cache_dir = config.cache_dir().to_path_buf();
        Self {
            config,
            cache_dir,
            resolved: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Configuration the manager resolves names against.
    #[must_use]
    pub const fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Warnings collected so far, e.g. refresh failures that fell back to cache.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Drains collected warnings.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// Resolves a named source to its checkout.
    pub async fn resolve(&mut self, name: &str) -> Result<ResolvedSource> {
        let url = self.config.require(name)?.to_string();
        self.sync_checkout(name, name, &url).await
    }

    /// Absolute path of `relative` inside a named source's marker directory.
    pub async fn locate(&mut self, name: &str, relative: &str) -> Result<PathBuf> {
        validate_no_traversal(Path::new(relative))?;
        let source = self.resolve(name).await?;

        let marker = source.root.join(SOURCE_MARKER_DIR);
        if !marker.is_dir() {
            return Err(CucoError::SourceLayoutInvalid {
                name: name.to_string(),
                marker: SOURCE_MARKER_DIR.to_string(),
            }
            .into());
        }

        let path = marker.join(relative);
        if !path.exists() {
            return Err(CucoError::ResourceFileNotFound {
                path: format!("{SOURCE_MARKER_DIR}/{relative}"),
                source_name: format!("source '{name}'"),
            }
            .into());
        }
        Ok(path)
    }

    /// Resolves an agent-skills repository.
    ///
    /// The identifier is normalized to `owner/repo`. A named source registered
    /// under exactly that identifier supplies the URL; otherwise the repository
    /// is fetched from GitHub. Either way the checkout lives only in the cache
    /// and nothing is added to configuration.
    pub async fn resolve_agentskills(&mut self, repo: &str) -> Result<ResolvedSource> {
        let repo = normalize_agentskills_repo(repo);
        let url = match self.config.lookup(&repo) {
            Some((url, _)) => url.to_string(),
            None => format!("https://github.com/{repo}.git"),
        };
        self.sync_checkout(&repo, &format!("agentskills/{repo}"), &url).await
    }

    /// Absolute path of `skills/<skill>/` in an agent-skills repository.
    ///
    /// The directory must contain `SKILL.md`.
    pub async fn locate_agentskill(&mut self, repo: &str, skill: &str) -> Result<PathBuf> {
        let source = self.resolve_agentskills(repo).await?;
        let path = source.root.join("skills").join(skill);
        if !path.join(SKILL_MANIFEST).is_file() {
            return Err(CucoError::ResourceFileNotFound {
                path: format!("skills/{skill}/{SKILL_MANIFEST}"),
                source_name: format!("agent-skills repository '{}'", source.name),
            }
            .into());
        }
        Ok(path)
    }

    async fn sync_checkout(
        &mut self,
        name: &str,
        cache_name: &str,
        url: &str,
    ) -> Result<ResolvedSource> {
        let entry = CacheEntry::new(&self.cache_dir, cache_name);
        if let Some(resolved) = self.resolved.get(&entry.key) {
            return Ok(resolved.clone());
        }
        ensure_git_available()?;

        if let Some(parent) = entry.checkout.parent() {
            ensure_dir(parent)?;
        }
        let _lock = CacheLock::acquire(&self.cache_dir, &entry.key).await?;

        let repo = GitRepo::new(&entry.checkout);
        let display_url = strip_auth_from_url(url);
        let metadata = entry.read_metadata().await;

        if entry.checkout.exists() && !self.is_usable(&repo, metadata.as_ref(), url).await {
            warn!("Repairing cache for source '{name}' at {}", entry.checkout.display());
            remove_path(&entry.checkout)?;
        }

        let fresh = if entry.checkout.exists() {
            match repo.pull().await {
                Ok(()) => {
                    debug!("Refreshed source '{name}' from {display_url}");
                    self.record_sync(&entry, &repo, url).await?;
                    true
                }
                Err(e) => {
                    let since = metadata
                        .as_ref()
                        .map(|m| format!(" from {}", m.last_synced.format("%Y-%m-%d %H:%M UTC")))
                        .unwrap_or_default();
                    let warning = format!(
                        "Could not refresh source '{name}' ({display_url}); using cached copy{since}: {}",
                        first_line(&format!("{e:#}"))
                    );
                    warn!("{warning}");
                    self.warnings.push(warning);
                    false
                }
            }
        } else {
            info!("Cloning source '{name}' from {display_url}");
            if let Err(e) = GitRepo::clone_with_context(url, &entry.checkout, Some(name)).await {
                let _ = remove_path(&entry.checkout);
                return Err(CucoError::SourceUnavailable {
                    name: name.to_string(),
                    url: display_url,
                    reason: format!("{e:#}"),
                }
                .into());
            }
            self.record_sync(&entry, &repo, url).await?;
            true
        };

        let resolved = ResolvedSource {
            name: name.to_string(),
            url: url.to_string(),
            root: entry.checkout.clone(),
            fresh,
        };
        self.resolved.insert(entry.key, resolved.clone());
        Ok(resolved)
    }

    /// A checkout is usable when it is healthy and was cloned from `url`.
    async fn is_usable(&self, repo: &GitRepo, metadata: Option<&CacheMetadata>, url: &str) -> bool {
        if !repo.is_healthy().await {
            return false;
        }
        match metadata {
            Some(metadata) => metadata.url == url,
            None => repo.remote_url().await.is_ok_and(|remote| remote == url),
        }
    }

    async fn record_sync(&self, entry: &CacheEntry, repo: &GitRepo, url: &str) -> Result<()> {
        let metadata = CacheMetadata {
            url: url.to_string(),
            last_synced: Utc::now(),
            commit: repo.current_commit().await.ok(),
        };
        entry.write_metadata(&metadata).await
    }
}

fn first_line(text: &str) -> &str {
    text.lines().find(|l| !l.trim().is_empty()).unwrap_or(text).trim()
}
