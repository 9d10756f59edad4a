//! Project-level configuration at `<project>/.cuco.toml`.
//!
//! Only named sources live here. They shadow global sources of the same name.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;

use crate::utils::fs::atomic_write;

/// Project configuration file contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Named sources, name -> git URL
    #[serde(default)]
    pub sources: BTreeMap<String, String>,
}

impl ProjectConfig {
    /// Loads the file, or returns an empty configuration when it does not exist.
    pub async fn load_or_default(path: &Path) -> Result<Self> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read project config from {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse project config from {}", path.display()))
    }

    /// Writes the configuration atomically.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize project config")?;
        let target = path.to_path_buf();
        tokio::task::spawn_blocking(move || atomic_write(&target, content.as_bytes()))
            .await
            .context("Config write task panicked")?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".cuco.toml");
        assert!(ProjectConfig::load_or_default(&path).await.unwrap().sources.is_empty());

        let mut config = ProjectConfig::default();
        config.sources.insert("acme".to_string(), "file:///tmp/acme".to_string());
        config.save_to(&path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[sources]"));
        assert_eq!(ProjectConfig::load_or_default(&path).await.unwrap(), config);
    }
}
