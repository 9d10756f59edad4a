use cuco_cli::config::{ConfigOverrides, SourceConfig, SourceScope};
use cuco_cli::installer::Materializer;
use cuco_cli::manifest::find_bundle;
use cuco_cli::resolver::resolve;
use cuco_cli::source::SourceManager;
use cuco_cli::target::{TargetEngine, select};
use predicates::prelude::*;
use serial_test::serial;
use std::fs;

use crate::common::TestProject;

const SKILL: &str = ".github/skills/review/SKILL.md";

const SKILL_BUNDLE: &str = r#"{
  "name": "skills",
  "version": "1.0.0",
  "dependencies": {
    "skills": [{"name": "review", "type": "custom", "source_name": "acme", "source": "skills/review"}]
  }
}"#;

fn project_with_acme() -> (TestProject, cuco_cli::test_utils::SourceRepoFixture) {
    let project = TestProject::new();
    let acme = project.source_repo("acme");
    acme.write("skills/review/SKILL.md", "review v1\n").unwrap().commit("v1").unwrap();
    project.registry().bundle("skills", SKILL_BUNDLE).unwrap();
    project.cuco().args(["source", "add", "acme", &acme.url()]).assert().success();
    (project, acme)
}

#[test]
fn test_git_source_update_reaches_sync() {
    let (project, acme) = project_with_acme();
    project.cuco().args(["install", "skills"]).assert().success();
    assert_eq!(project.read_installed(SKILL), "review v1\n");

    acme.write("skills/review/SKILL.md", "review v2\n")
        .unwrap()
        .write("skills/review/extra.md", "extra\n")
        .unwrap()
        .commit("v2")
        .unwrap();

    project.cuco().args(["sync", "skills"]).assert().success();
    assert_eq!(project.read_installed(SKILL), "review v2\n");
    assert_eq!(project.read_installed(".github/skills/review/extra.md"), "extra\n");
}

#[test]
fn test_unreachable_source_uses_cached_copy() {
    let (project, acme) = project_with_acme();
    project.cuco().args(["install", "skills"]).assert().success();

    fs::remove_dir_all(acme.path()).unwrap();

    project
        .cuco()
        .args(["status", "skills"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Could not refresh source 'acme'"))
        .stderr(predicate::str::contains("using cached copy"))
        .stdout(predicate::str::contains("Up to date"));
}

#[test]
fn test_unreachable_source_without_cache_fails() {
    let project = TestProject::new();
    project.registry().bundle("skills", SKILL_BUNDLE).unwrap();
    let missing = project.cache_path().with_file_name("gone");
    project
        .cuco()
        .args(["source", "add", "acme", &cuco_cli::test_utils::file_url(&missing)])
        .assert()
        .success();

    project
        .cuco()
        .args(["install", "skills"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Source 'acme' is unavailable"));

    assert!(!project.installed(".github/skills").exists());
    assert!(!project.cache_path().join("sources/acme").exists());
}

#[test]
fn test_source_without_marker_is_rejected() {
    let project = TestProject::new();
    let plain = cuco_cli::test_utils::SourceRepoFixture::create_bare_layout(
        &project.cache_path().with_file_name("plain"),
    )
    .unwrap();
    plain.write_raw("skills/review/SKILL.md", "x\n").unwrap().commit("init").unwrap();
    project.registry().bundle("skills", SKILL_BUNDLE).unwrap();
    project.cuco().args(["source", "add", "acme", &plain.url()]).assert().success();

    project
        .cuco()
        .args(["install", "skills"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("wrong layout"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_resolution_shares_one_checkout() {
    let (project, _acme) = project_with_acme();
    let config = project.config().await;

    let mut first = SourceManager::new(config.clone());
    let mut second = SourceManager::new(config);
    let (a, b) = tokio::join!(first.resolve("acme"), second.resolve("acme"));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.root, b.root);
    assert!(a.root.join("custom_copilot/skills/review/SKILL.md").is_file());
}

#[tokio::test]
async fn test_library_install_matches_cli_layout() {
    let (project, _acme) = project_with_acme();
    let config = project.config().await;
    let bundle = find_bundle("skills", config.registry_dir()).unwrap();

    let mut sources = SourceManager::new(config);
    let resolution = resolve(&bundle, &mut sources).await.unwrap();
    let target = select(project.project_path(), Some(TargetEngine::Claude));
    let report = Materializer::new(&target).install(&resolution, false).unwrap();

    assert!(report.is_complete());
    assert_eq!(report.installed.len(), 1);
    assert_eq!(project.read_installed(".claude/skills/review/SKILL.md"), "review v1\n");
}

#[tokio::test]
#[serial]
async fn test_environment_overrides() {
    let project = TestProject::new();
    // SAFETY: serialized with every other test that touches these variables.
    unsafe {
        std::env::set_var("CUCO_CONFIG", project.config_path());
        std::env::set_var("CUCO_CACHE_DIR", project.cache_path());
        std::env::set_var("CUCO_REGISTRY", project.registry().path());
    }

    let overrides = ConfigOverrides::from_env();
    let mut config = SourceConfig::load(project.project_path(), &overrides).await.unwrap();

    unsafe {
        std::env::remove_var("CUCO_CONFIG");
        std::env::remove_var("CUCO_CACHE_DIR");
        std::env::remove_var("CUCO_REGISTRY");
    }

    assert_eq!(config.cache_dir(), project.cache_path());
    assert_eq!(config.registry_dir(), project.registry().path());

    config.register("acme", "https://github.com/acme/copilot.git", SourceScope::Global, false).unwrap();
    config.save(SourceScope::Global).await.unwrap();
    let saved = fs::read_to_string(project.config_path()).unwrap();
    assert!(saved.contains("acme"));
}

#[test]
fn test_remove_keeps_local_edits() {
    let (project, _acme) = project_with_acme();
    project.cuco().args(["install", "skills"]).assert().success();
    project.write_installed(SKILL, "edited\n");

    project
        .cuco()
        .args(["remove", "skills"])
        .assert()
        .success()
        .stdout(predicate::str::contains("modified locally, kept"));
    assert_eq!(project.read_installed(SKILL), "edited\n");
    assert!(!project.record_path("skills").exists());

    project
        .cuco()
        .args(["remove", "skills"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("skills"));
}

#[test]
fn test_remove_deletes_unmodified_resources() {
    let project = TestProject::with_team_bundle();
    project.cuco().args(["install", "team"]).assert().success();

    project
        .cuco()
        .args(["remove", "team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed bundle 'team'"));

    assert!(!project.installed(".github/agents/reviewer.agent.md").exists());
    assert!(!project.installed(".github/prompts/triage.prompt.md").exists());
    assert!(!project.installed(".github/copilot-instructions.md").exists());
    assert!(!project.record_path("team").exists());
}

#[test]
fn test_remove_rejects_path_like_bundle_names() {
    let project = TestProject::with_team_bundle();
    project.cuco().args(["install", "team"]).assert().success();
    // A record reachable from the record directory through `..`.
    fs::copy(project.record_path("team"), project.installed(".github/team.lock")).unwrap();

    project
        .cuco()
        .args(["remove", "../team"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid file name"));

    assert!(project.installed(".github/agents/reviewer.agent.md").is_file());
    assert!(project.installed(".github/team.lock").is_file());
    assert!(project.record_path("team").is_file());
}
