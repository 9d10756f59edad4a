//! Content fingerprints for installed resources.
//!
//! A file fingerprint is `sha256:<hex>` over its bytes. A directory fingerprint is
//! `sha256:<hex>` over the lines `"<relative path>:<file fingerprint>\n"` sorted by
//! relative path, with `/` separators on every platform. The result depends on
//! content and relative layout only, never on traversal order or location.
//!
//! [`fingerprint_files`] computes the same digest from in-memory content, so a
//! rendered resource can be compared against what is on disk without writing it.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Fingerprint of a byte slice.
#[must_use]
pub fn fingerprint_bytes(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

/// Fingerprint of a tree given as `(relative path, content)` pairs.
///
/// Input order does not matter.
#[must_use]
pub fn fingerprint_files(files: &[(String, Vec<u8>)]) -> String {
    let mut entries: Vec<(&str, String)> =
        files.iter().map(|(path, content)| (path.as_str(), fingerprint_bytes(content))).collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut hasher = Sha256::new();
    for (path, checksum) in &entries {
        hasher.update(format!("{path}:{checksum}\n").as_bytes());
    }
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

/// Fingerprint of a file or directory on disk.
///
/// Unreadable input is an error; it is never treated as empty content.
pub fn fingerprint(path: &Path) -> Result<String> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("Cannot read {} for fingerprinting", path.display()))?;

    if metadata.is_dir() {
        let files = crate::utils::fs::read_tree(path)?;
        Ok(fingerprint_files(&files))
    } else {
        let content = fs::read(path).with_context(|| {
            format!(
                "Cannot read file for checksum calculation: {}\n\n\
                Check that the file exists and is readable.",
                path.display()
            )
        })?;
        Ok(fingerprint_bytes(&content))
    }
}

/// Fingerprint of whatever is at `path`, or `None` if nothing is there.
pub fn fingerprint_if_present(path: &Path) -> Result<Option<String>> {
    match fs::symlink_metadata(path) {
        Ok(_) => fingerprint(path).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Cannot inspect {}", path.display())),
    }
}
