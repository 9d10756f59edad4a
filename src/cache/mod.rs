//! On-disk layout of the source cache.
//!
//! ```text
//! <cache>/
//! ├── .locks/
//! │   └── acme.lock
//! └── sources/
//!     ├── acme/                 # git checkout
//!     ├── acme.meta.toml        # url + last_synced
//!     ├── anthropics_skills/
//!     └── anthropics_skills.meta.toml
//! ```
//!
//! Entries are created on first use, refreshed on each resolution and never
//! deleted automatically. The metadata file is written after every successful
//! clone or refresh; its absence next to an existing checkout marks an entry
//! whose first clone never completed.

pub mod lock;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::fs::atomic_write;
use crate::utils::path_validation::sanitize_file_name;

pub use lock::CacheLock;

/// Metadata stored next to each cached checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// URL the checkout was cloned from
    pub url: String,
    /// Last successful clone or refresh
    pub last_synced: DateTime<Utc>,
    /// `HEAD` after the last sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

/// Paths of one cache entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Key used for directory and lock names
    pub key: String,
    /// Checkout directory
    pub checkout: PathBuf,
    /// Metadata file
    pub metadata: PathBuf,
}

impl CacheEntry {
    /// Entry for `name` under `cache_dir`.
    #[must_use]
    pub fn new(cache_dir: &Path, name: &str) -> Self {
        let key = sanitize_file_name(name);
        let sources = cache_dir.join("sources");
        Self {
            checkout: sources.join(&key),
            metadata: sources.join(format!("{key}.meta.toml")),
            key,
        }
    }

    /// Reads the metadata file; `None` when missing or unreadable.
    pub async fn read_metadata(&self) -> Option<CacheMetadata> {
        let content = tokio::fs::read_to_string(&self.metadata).await.ok()?;
        match toml::from_str(&content) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                tracing::warn!("Ignoring corrupt cache metadata {}: {e}", self.metadata.display());
                None
            }
        }
    }

    /// Writes the metadata file atomically.
    pub async fn write_metadata(&self, metadata: &CacheMetadata) -> Result<()> {
        let content = toml::to_string_pretty(metadata).context("Failed to serialize cache metadata")?;
        let path = self.metadata.clone();
        tokio::task::spawn_blocking(move || atomic_write(&path, content.as_bytes()))
            .await
            .context("Cache metadata write task panicked")?
    }
}
