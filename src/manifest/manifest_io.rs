//! Loading bundles from disk and locating them in the registry.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::{BundleManifest, LoadedBundle};
use crate::constants::{MANIFEST_FILE, REGISTRY_BUNDLES_DIR};
use crate::core::CucoError;

/// Loads and validates `<dir>/bundle.json`.
pub fn load_manifest(dir: &Path) -> Result<LoadedBundle> {
    let path = dir.join(MANIFEST_FILE);
    let content = fs::read_to_string(&path).with_context(|| {
        format!(
            "Cannot read bundle manifest: {}\n\n\
            A bundle directory must contain a {MANIFEST_FILE} file",
            path.display()
        )
    })?;

    let manifest: BundleManifest =
        serde_json::from_str(&content).map_err(|e| CucoError::ManifestParseError {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;
    manifest.validate()?;

    debug!("Loaded bundle '{}' {} from {}", manifest.name, manifest.version, dir.display());

    Ok(LoadedBundle {
        dir: dir.to_path_buf(),
        manifest,
    })
}

/// Finds a bundle by path or by name.
///
/// `spec` is tried first as a directory containing `bundle.json`, then as a
/// bundle name under `<registry>/bundles/<spec>/`. When neither exists the
/// error lists the closest registry bundle names.
pub fn find_bundle(spec: &str, registry: &Path) -> Result<LoadedBundle> {
    let as_path = Path::new(spec);
    if as_path.join(MANIFEST_FILE).is_file() {
        return load_manifest(as_path);
    }

    let named = registry.join(REGISTRY_BUNDLES_DIR).join(spec);
    if named.join(MANIFEST_FILE).is_file() {
        return load_manifest(&named);
    }

    let known = bundle_dir_names(registry);
    let mut suggestions: Vec<(f64, String)> = known
        .into_iter()
        .map(|name| (strsim::jaro_winkler(spec, &name), name))
        .filter(|(score, _)| *score >= 0.75)
        .collect();
    suggestions.sort_by(|a, b| b.0.total_cmp(&a.0));

    Err(CucoError::BundleNotFound {
        name: spec.to_string(),
        suggestions: suggestions.into_iter().take(3).map(|(_, name)| name).collect(),
    }
    .into())
}

/// Lists bundles available in the registry, sorted by name.
///
/// Bundles whose manifest fails to load are skipped with a warning.
pub fn list_bundles(registry: &Path) -> Result<Vec<LoadedBundle>> {
    let mut bundles = Vec::new();
    for name in bundle_dir_names(registry) {
        let dir = registry.join(REGISTRY_BUNDLES_DIR).join(&name);
        match load_manifest(&dir) {
            Ok(bundle) => bundles.push(bundle),
            Err(e) => warn!("Skipping bundle '{name}': {e:#}"),
        }
    }
    Ok(bundles)
}

fn bundle_dir_names(registry: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(registry.join(REGISTRY_BUNDLES_DIR)) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|e| e.path().join(MANIFEST_FILE).is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
