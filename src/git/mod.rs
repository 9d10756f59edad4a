//! Git operations for named sources.
//!
//! cuco shells out to the system `git` binary rather than embedding a git
//! implementation, so SSH agents, credential helpers and user git configuration
//! all work unchanged. All operations are async on top of Tokio.
//!
//! Only the small set of operations the source cache needs is exposed:
//!
//! - [`GitRepo::clone`]: initial clone into the cache
//! - [`GitRepo::pull`]: fast-forward refresh of an existing clone
//! - [`GitRepo::is_healthy`]: whether a cache directory is a usable checkout
//! - [`GitRepo::remote_url`] and [`GitRepo::current_commit`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use cuco_cli::git::GitRepo;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let repo = GitRepo::clone("https://github.com/acme/resources.git", "/tmp/acme").await?;
//! repo.pull().await?;
//! println!("at {}", repo.current_commit().await?);
//! # Ok(())
//! # }
//! ```

pub mod command_builder;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::core::CucoError;
use command_builder::GitCommand;

/// Handle to a local git checkout.
#[derive(Debug, Clone)]
pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    /// Wraps an existing directory. Does not check that it is a repository.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Clones `url` into `target`.
    pub async fn clone(url: &str, target: impl AsRef<Path>) -> Result<Self> {
        Self::clone_with_context(url, target, None).await
    }

    /// Clones `url` into `target`, labelling log lines with `context`.
    pub async fn clone_with_context(
        url: &str,
        target: impl AsRef<Path>,
        context: Option<&str>,
    ) -> Result<Self> {
        let target = target.as_ref();
        let mut cmd = GitCommand::clone(url, target);
        if let Some(ctx) = context {
            cmd = cmd.with_context(ctx);
        }
        cmd.execute_success().await?;
        Ok(Self::new(target))
    }

    /// Fast-forwards the current branch from its upstream.
    pub async fn pull(&self) -> Result<()> {
        GitCommand::pull_fast_forward().current_dir(&self.path).execute_success().await
    }

    /// URL of the `origin` remote.
    pub async fn remote_url(&self) -> Result<String> {
        GitCommand::remote_url().current_dir(&self.path).execute_stdout().await
    }

    /// Commit hash of `HEAD`.
    pub async fn current_commit(&self) -> Result<String> {
        GitCommand::rev_parse("HEAD").current_dir(&self.path).execute_stdout().await
    }

    /// Whether the directory has a `.git` entry.
    #[must_use]
    pub fn is_git_repo(&self) -> bool {
        self.path.join(".git").exists()
    }

    /// Whether the checkout is usable: it is a repository and `HEAD` resolves.
    ///
    /// An interrupted clone can leave a `.git` directory without any commit;
    /// that is not healthy.
    pub async fn is_healthy(&self) -> bool {
        self.is_git_repo() && self.current_commit().await.is_ok()
    }

    /// Root of the checkout.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Fails with [`CucoError::GitNotFound`] when no git executable is on PATH.
pub fn ensure_git_available() -> Result<()> {
    if !crate::utils::platform::command_exists(crate::utils::platform::get_git_command()) {
        return Err(CucoError::GitNotFound.into());
    }
    Ok(())
}

/// Removes `user:password@` from http(s) URLs for display.
#[must_use]
pub fn strip_auth_from_url(url: &str) -> String {
    for scheme in ["https://", "http://"] {
        if let Some(rest) = url.strip_prefix(scheme) {
            let host_end = rest.find('/').unwrap_or(rest.len());
            if let Some(at) = rest[..host_end].rfind('@') {
                return format!("{scheme}{}", &rest[at + 1..]);
            }
        }
    }
    url.to_string()
}
