//! I/O operations for record loading and saving.
//!
//! Records are written atomically (temp file + rename), so a record on disk is
//! always either the previous or the new version.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::constants::{RECORD_DIR, RECORD_EXTENSION, RECORD_FORMAT_VERSION};
use crate::core::CucoError;
use crate::utils::fs::{atomic_write, remove_path};

use super::BundleRecord;

impl BundleRecord {
    /// Loads a record; `Ok(None)` when the file does not exist.
    ///
    /// Syntax errors and records written by a newer format version are
    /// [`CucoError::RecordParseError`].
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).with_context(|| {
            format!(
                "Cannot read install record: {}\n\n\
                    Possible causes:\n\
                    - Permission denied (check file ownership)\n\
                    - File is locked by another process",
                path.display()
            )
        })?;

        let record: Self = toml::from_str(&content).map_err(|e| CucoError::RecordParseError {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;

        if record.version > RECORD_FORMAT_VERSION {
            return Err(CucoError::RecordParseError {
                file: path.display().to_string(),
                reason: format!(
                    "format version {} is newer than supported version {RECORD_FORMAT_VERSION}",
                    record.version
                ),
            }
            .into());
        }

        debug!("Loaded record {} with {} resources", path.display(), record.resources.len());
        Ok(Some(record))
    }

    /// Writes the record atomically, creating `.cuco-bundles/` as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = String::from("# Auto-generated by cuco - DO NOT EDIT\n");
        content.push_str(&toml::to_string(self).context("Failed to serialize install record")?);

        atomic_write(path, content.as_bytes()).with_context(|| {
            format!(
                "Cannot write install record: {}\n\n\
                    Possible causes:\n\
                    - Permission denied\n\
                    - Disk is full or read-only",
                path.display()
            )
        })?;
        debug!("Saved record {}", path.display());
        Ok(())
    }

    /// Deletes the record file.
    pub fn delete(path: &Path) -> Result<()> {
        remove_path(path)
    }
}

/// Every readable record under a target root, sorted by bundle name.
///
/// Unreadable records are skipped with a warning.
pub fn list_records(target_root: &Path) -> Result<Vec<BundleRecord>> {
    let dir = target_root.join(RECORD_DIR);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for entry in fs::read_dir(&dir).with_context(|| format!("Cannot list {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
            continue;
        }
        match BundleRecord::load(&path) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => warn!("Skipping unreadable record {}: {e:#}", path.display()),
        }
    }
    records.sort_by(|a, b| a.bundle.cmp(&b.bundle));
    Ok(records)
}
