//! File system helpers with atomic replace semantics
//!
//! Every write into a target tree goes through this module. Single files are
//! written to a sibling temporary file, synced, then renamed over the destination.
//! Directories are staged next to the destination and swapped in with renames, so
//! a reader never observes a half-written skill directory.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cuco_cli::utils::fs::{atomic_write, ensure_dir};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new(".github/agents"))?;
//! atomic_write(Path::new(".github/agents/reviewer.agent.md"), b"# Reviewer")?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Ensures a directory exists, creating it and all parent directories if necessary.
///
/// Fails if the path exists but is not a directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(anyhow::anyhow!(
                "Path exists but is not a directory: {}",
                path.display()
            ));
        }
        return Ok(());
    }

    fs::create_dir_all(path).with_context(|| {
        format!(
            "Failed to create directory: {}\n\nCheck that the parent directory is writable",
            path.display()
        )
    })
}

/// Ensures the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        ensure_dir(parent)?;
    }
    Ok(())
}

/// Atomically writes bytes to a file.
///
/// Content goes to a hidden `.<name>.tmp` sibling first, is synced to disk,
/// then renamed over the destination. Parent directories are created when
/// missing. On any failure the temporary file is removed.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;

    let temp_path = temp_sibling(path, "tmp");
    let result = write_synced(&temp_path, content).and_then(|()| {
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to rename temp file to: {}", path.display()))
    });
    if result.is_err() {
        let _ = remove_path(&temp_path);
    }
    result
}

fn write_synced(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    let mut file = fs::File::create(path).with_context(|| {
        format!(
            "Failed to create temp file: {}\n\nCheck file permissions and that the directory exists",
            path.display()
        )
    })?;
    file.write_all(content)
        .with_context(|| format!("Failed to write to temp file: {}", path.display()))?;
    file.sync_all().with_context(|| "Failed to sync file to disk")
}

/// Atomically replaces a directory with the given set of files.
///
/// `files` holds `(relative path, content)` pairs. The new tree is staged in a
/// uniquely named sibling directory. The previous directory, if any, is renamed
/// aside, the staged one renamed into place, and the old one deleted. If the swap
/// fails the previous directory is restored.
pub fn atomic_replace_dir(dest: &Path, files: &[(String, Vec<u8>)]) -> Result<()> {
    ensure_parent_dir(dest)?;

    let staging = temp_sibling(dest, &format!("staging-{}", uuid::Uuid::new_v4()));
    let result = write_tree(&staging, files).and_then(|()| swap_into_place(&staging, dest));
    if result.is_err() && staging.exists() {
        let _ = fs::remove_dir_all(&staging);
    }
    result
}

fn write_tree(root: &Path, files: &[(String, Vec<u8>)]) -> Result<()> {
    ensure_dir(root)?;
    for (relative, content) in files {
        let path = root.join(relative);
        ensure_parent_dir(&path)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write staged file: {}", path.display()))?;
    }
    Ok(())
}

fn swap_into_place(staging: &Path, dest: &Path) -> Result<()> {
    let backup = if dest.exists() || dest.is_symlink() {
        let backup = temp_sibling(dest, &format!("old-{}", uuid::Uuid::new_v4()));
        fs::rename(dest, &backup)
            .with_context(|| format!("Failed to move aside existing {}", dest.display()))?;
        Some(backup)
    } else {
        None
    };

    if let Err(e) = fs::rename(staging, dest) {
        if let Some(backup) = &backup {
            let _ = fs::rename(backup, dest);
        }
        return Err(e).with_context(|| format!("Failed to move staged tree into {}", dest.display()));
    }

    if let Some(backup) = backup {
        remove_path(&backup)?;
    }
    Ok(())
}

/// Sibling path used for staging, e.g. `skills/review` -> `skills/.review.tmp`.
fn temp_sibling(path: &Path, suffix: &str) -> PathBuf {
    let name = path.file_name().map_or_else(|| "cuco".into(), |n| n.to_string_lossy().into_owned());
    let temp_name = format!(".{name}.{suffix}");
    path.parent().map_or_else(|| PathBuf::from(&temp_name), |parent| parent.join(&temp_name))
}

/// Removes a file or directory tree. Missing paths are not an error.
pub fn remove_path(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to inspect {}", path.display()));
        }
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))
    } else {
        fs::remove_file(path).with_context(|| format!("Failed to remove file: {}", path.display()))
    }
}

/// Reads every regular file under `dir` into memory.
///
/// Returns `(relative path, content)` pairs with `/` separators, sorted by path.
/// `.git` directories are skipped. Symlinks to files inside `dir` are read as
/// their target's content; other symlinks are skipped with a warning.
pub fn read_tree(dir: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    let canonical_root = dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
    {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        let file_type = entry.file_type();
        if file_type.is_symlink() {
            match fs::canonicalize(entry.path()) {
                Ok(resolved) if resolved.starts_with(&canonical_root) && resolved.is_file() => {}
                Ok(resolved) if resolved.is_dir() => {
                    warn!("Skipping symlinked directory {}", entry.path().display());
                    continue;
                }
                _ => {
                    warn!(
                        "Skipping symlink {} that does not resolve to a file inside {}",
                        entry.path().display(),
                        dir.display()
                    );
                    continue;
                }
            }
        } else if !file_type.is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(dir)
            .with_context(|| format!("Failed to relativize {}", entry.path().display()))?;
        let content = fs::read(entry.path())
            .with_context(|| format!("Failed to read {}", entry.path().display()))?;
        files.push((crate::utils::platform::normalize_path_for_storage(relative), content));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}
