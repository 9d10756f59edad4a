//! Validation for paths coming from manifests and for write destinations.

use anyhow::{Context, Result, anyhow};
use std::path::{Component, Path, PathBuf};

use crate::core::CucoError;

/// Rejects absolute paths and paths with `..` components.
///
/// Used for every path read out of a bundle manifest, so entries cannot reach
/// outside their bundle directory, registry or source checkout.
pub fn validate_no_traversal(path: &Path) -> Result<()> {
    if path.is_absolute() || path.has_root() {
        return Err(anyhow!("Absolute paths are not allowed: {}", path.display()));
    }
    for component in path.components() {
        match component {
            Component::ParentDir => {
                return Err(anyhow!("Path traversal ('..') is not allowed: {}", path.display()));
            }
            Component::Prefix(_) => {
                return Err(anyhow!("Drive-prefixed paths are not allowed: {}", path.display()));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Lexically normalizes a path, resolving `.` and `..` without touching disk.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Fails with [`CucoError::PathEscapesTarget`] if `dest` is not inside `root`.
///
/// The check runs twice: lexically, then on the canonical form of both paths
/// so a symlinked directory under `root` cannot redirect a write elsewhere.
/// Components that do not exist yet are appended to the canonical form of
/// their nearest existing ancestor.
pub fn ensure_within(root: &Path, dest: &Path) -> Result<()> {
    let escapes = || -> anyhow::Error {
        CucoError::PathEscapesTarget {
            path: dest.display().to_string(),
        }
        .into()
    };

    let lexical_root = normalize_lexically(root);
    let lexical_dest = normalize_lexically(dest);
    if !lexical_dest.starts_with(&lexical_root) || lexical_dest == lexical_root {
        return Err(escapes());
    }

    let canonical_root = safe_canonicalize(&lexical_root)?;
    let canonical_dest = safe_canonicalize(&lexical_dest)?;
    if canonical_dest.starts_with(&canonical_root) && canonical_dest != canonical_root {
        Ok(())
    } else {
        Err(escapes())
    }
}

/// Canonicalizes the longest existing prefix of `path` and appends the rest.
///
/// A path with no existing ancestor is returned unchanged.
pub fn safe_canonicalize(path: &Path) -> Result<PathBuf> {
    let mut existing = path;
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(path.to_path_buf()),
        }
    }
    if existing.as_os_str().is_empty() {
        return Ok(path.to_path_buf());
    }

    let mut canonical = existing
        .canonicalize()
        .with_context(|| format!("Failed to resolve path: {}", existing.display()))?;
    for name in missing.iter().rev() {
        canonical.push(name);
    }
    Ok(canonical)
}

/// Whether `name` can be used as a single file or directory name.
///
/// Names must be non-empty, must not be `.` or `..`, and must not contain
/// separators or characters that are invalid in file names on any platform.
#[must_use]
pub fn is_safe_file_name(name: &str) -> bool {
    const FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0'];
    !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.chars().any(|c| FORBIDDEN.contains(&c) || c.is_control())
}

/// Turns an arbitrary string into a file-name-safe slug.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect()
}
