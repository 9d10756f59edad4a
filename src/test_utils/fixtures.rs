//! On-disk fixtures: source repositories, registries and bundles.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::TestGit;
use crate::constants::{MANIFEST_FILE, REGISTRY_BUNDLES_DIR, SOURCE_MARKER_DIR};

/// A local git repository laid out as a named source.
///
/// Files written with [`write`](Self::write) land under `custom_copilot/`.
pub struct SourceRepoFixture {
    git: TestGit,
}

impl SourceRepoFixture {
    /// Creates an initialized repository at `path` with an empty marker directory.
    pub fn create(path: &Path) -> Result<Self> {
        fs::create_dir_all(path.join(SOURCE_MARKER_DIR))
            .with_context(|| format!("Failed to create {}", path.display()))?;
        fs::write(path.join(SOURCE_MARKER_DIR).join(".keep"), "")?;
        let git = TestGit::new(path);
        git.init()?;
        git.config_user()?;
        Ok(Self {
            git,
        })
    }

    /// Creates a repository whose files are written at the root, without a marker.
    pub fn create_bare_layout(path: &Path) -> Result<Self> {
        fs::create_dir_all(path).with_context(|| format!("Failed to create {}", path.display()))?;
        let git = TestGit::new(path);
        git.init()?;
        git.config_user()?;
        Ok(Self {
            git,
        })
    }

    /// Writes a file relative to the marker directory.
    pub fn write(&self, relative: &str, content: &str) -> Result<&Self> {
        self.write_raw(&format!("{SOURCE_MARKER_DIR}/{relative}"), content)
    }

    /// Writes a file relative to the repository root.
    pub fn write_raw(&self, relative: &str, content: &str) -> Result<&Self> {
        let path = self.git.repo_path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(self)
    }

    /// Stages everything and commits.
    pub fn commit(&self, message: &str) -> Result<&Self> {
        self.git.add_all()?;
        self.git.commit(message)?;
        Ok(self)
    }

    /// `file://` URL of the repository.
    #[must_use]
    pub fn url(&self) -> String {
        file_url(self.git.repo_path())
    }

    /// Repository root.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.git.repo_path()
    }
}

/// `file://` URL for a local path, with forward slashes.
#[must_use]
pub fn file_url(path: &Path) -> String {
    let normalized = path.display().to_string().replace('\\', "/");
    if normalized.starts_with('/') {
        format!("file://{normalized}")
    } else {
        format!("file:///{normalized}")
    }
}

/// A registry directory with resources and named bundles.
pub struct RegistryFixture {
    root: PathBuf,
}

impl RegistryFixture {
    /// Creates the registry root.
    pub fn create(root: &Path) -> Result<Self> {
        fs::create_dir_all(root.join(REGISTRY_BUNDLES_DIR))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Writes a registry resource file.
    pub fn write(&self, relative: &str, content: &str) -> Result<&Self> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(self)
    }

    /// Writes `bundles/<name>/bundle.json` and returns the bundle directory.
    pub fn bundle(&self, name: &str, manifest_json: &str) -> Result<PathBuf> {
        let dir = self.root.join(REGISTRY_BUNDLES_DIR).join(name);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(MANIFEST_FILE), manifest_json)?;
        Ok(dir)
    }

    /// Registry root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }
}
