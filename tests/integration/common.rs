//! Shared project fixture for the integration suite.

#![allow(dead_code)]

use assert_cmd::Command;
use cuco_cli::config::{ConfigOverrides, SourceConfig};
use cuco_cli::test_utils::{RegistryFixture, SourceRepoFixture, init_test_logging};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Bundle used by most scenarios: a registry agent, a registry prompt and a
/// bundle-local primary instructions document.
pub const TEAM_BUNDLE: &str = r#"{
  "name": "team",
  "version": "1.0.0",
  "description": "Team helpers",
  "dependencies": {
    "agents": [
      {"name": "reviewer", "type": "reference", "source": "agents/reviewer.md"}
    ],
    "prompts": [
      {"name": "triage", "type": "reference", "source": "prompts/triage.md"}
    ]
  },
  "copilotInstructions": {"type": "inline", "path": "instructions.md"}
}"#;

/// An isolated project with its own registry, cache and global config.
pub struct TestProject {
    temp: TempDir,
    project: PathBuf,
    registry: RegistryFixture,
}

impl TestProject {
    pub fn new() -> Self {
        init_test_logging(None);
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        fs::create_dir_all(&project).unwrap();
        let registry = RegistryFixture::create(&temp.path().join("registry")).unwrap();
        Self {
            temp,
            project,
            registry,
        }
    }

    /// Project with [`TEAM_BUNDLE`] and its registry resources in place.
    pub fn with_team_bundle() -> Self {
        let project = Self::new();
        project
            .registry
            .write("agents/reviewer.md", "# {{name}}\n\nReview agent v1\n")
            .unwrap()
            .write("prompts/triage.md", "Triage prompt v1\n")
            .unwrap();
        let dir = project.registry.bundle("team", TEAM_BUNDLE).unwrap();
        fs::write(dir.join("instructions.md"), "Team instructions\n").unwrap();
        project
    }

    pub fn registry(&self) -> &RegistryFixture {
        &self.registry
    }

    pub fn project_path(&self) -> &Path {
        &self.project
    }

    pub fn cache_path(&self) -> PathBuf {
        self.temp.path().join("cache")
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp.path().join("home/config.toml")
    }

    /// Overrides matching the environment handed to the binary.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            global_config: Some(self.config_path()),
            cache_dir: Some(self.cache_path()),
            registry: Some(self.registry.path().to_path_buf()),
        }
    }

    pub async fn config(&self) -> SourceConfig {
        SourceConfig::load(&self.project, &self.overrides()).await.unwrap()
    }

    /// Creates a git source repository under the temp root.
    pub fn source_repo(&self, name: &str) -> SourceRepoFixture {
        SourceRepoFixture::create(&self.temp.path().join("sources").join(name)).unwrap()
    }

    /// `cuco` invocation scoped to this project.
    pub fn cuco(&self) -> Command {
        let mut cmd = Command::cargo_bin("cuco").unwrap();
        cmd.current_dir(&self.project)
            .env("CUCO_CONFIG", self.config_path())
            .env("CUCO_CACHE_DIR", self.cache_path())
            .env("CUCO_REGISTRY", self.registry.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn installed(&self, relative: &str) -> PathBuf {
        self.project.join(relative)
    }

    pub fn read_installed(&self, relative: &str) -> String {
        fs::read_to_string(self.installed(relative)).unwrap()
    }

    pub fn write_installed(&self, relative: &str, content: &str) {
        fs::write(self.installed(relative), content).unwrap();
    }

    pub fn record_path(&self, bundle: &str) -> PathBuf {
        self.project.join(format!(".github/.cuco-bundles/{bundle}.lock"))
    }
}
