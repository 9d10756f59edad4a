//! User-wide configuration at `~/.cuco/config.toml`.
//!
//! ```toml
//! # Registry holding built-in resources and named bundles
//! registry = "~/work/cuco-registry"
//!
//! # Where named sources are cloned
//! cache_dir = "~/.cache/cuco"
//!
//! [sources]
//! acme = "https://github.com/acme/copilot-resources.git"
//! internal = "git@git.example.com:team/customizations.git"
//! ```
//!
//! The file is written with `0600` permissions on Unix since source URLs may
//! embed access tokens.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::utils::fs::atomic_write;
use crate::utils::platform::get_home_dir;

/// Global configuration file contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Path to the built-in registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,

    /// Cache directory for cloned sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<String>,

    /// Named sources, name -> git URL
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sources: BTreeMap<String, String>,
}

impl GlobalConfig {
    /// Loads the file, or returns an empty configuration when it does not exist.
    pub async fn load_or_default(path: &Path) -> Result<Self> {
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::load_from(path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse global config from {}", path.display()))
    }

    /// Writes the configuration atomically, owner read/write only on Unix.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize global config")?;
        let target = path.to_path_buf();
        tokio::task::spawn_blocking(move || atomic_write(&target, content.as_bytes()))
            .await
            .context("Config write task panicked")??;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut perms = fs::metadata(path)
                .await
                .with_context(|| format!("Failed to read permissions for {}", path.display()))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).await.with_context(|| {
                format!("Failed to set secure permissions on {}", path.display())
            })?;
        }

        Ok(())
    }

    /// `~/.cuco/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        Ok(cuco_home()?.join("config.toml"))
    }
}

/// `~/.cuco`, the root for user-wide state.
pub fn cuco_home() -> Result<PathBuf> {
    Ok(get_home_dir()?.join(".cuco"))
}
