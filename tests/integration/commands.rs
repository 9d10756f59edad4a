use predicates::prelude::*;
use std::fs;

use crate::common::TestProject;

#[test]
fn test_init_creates_layout_once() {
    let project = TestProject::new();

    project
        .cuco()
        .args(["init", "--engine", "claude"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized claude layout"));

    for dir in [".claude", ".claude/agents", ".claude/commands", ".claude/skills"] {
        assert!(project.installed(dir).is_dir(), "{dir} missing");
    }

    project
        .cuco()
        .args(["init", "--engine", "claude"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already initialized"));
}

#[test]
fn test_unknown_engine_is_rejected() {
    let project = TestProject::new();
    project.cuco().args(["init", "--engine", "vim"]).assert().failure();
}

#[test]
fn test_source_add_list_remove() {
    let project = TestProject::new();

    project
        .cuco()
        .args(["source", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No sources registered."));

    project
        .cuco()
        .args(["source", "add", "acme", "https://github.com/acme/copilot.git"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added project source 'acme'"));
    assert!(project.installed(".cuco.toml").is_file());

    project
        .cuco()
        .args(["source", "add", "shared", "https://github.com/acme/shared.git", "--global"])
        .assert()
        .success();
    assert!(project.config_path().is_file());

    project
        .cuco()
        .args(["source", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("acme"))
        .stdout(predicate::str::contains("shared"));

    project.cuco().args(["source", "remove", "acme"]).assert().success();
    let config = fs::read_to_string(project.installed(".cuco.toml")).unwrap();
    assert!(!config.contains("acme"));
}

#[test]
fn test_source_add_conflicting_url_needs_force() {
    let project = TestProject::new();
    project
        .cuco()
        .args(["source", "add", "acme", "https://github.com/acme/one.git"])
        .assert()
        .success();

    project
        .cuco()
        .args(["source", "add", "acme", "https://github.com/acme/two.git"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    project
        .cuco()
        .args(["source", "add", "acme", "https://github.com/acme/two.git", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Replaced"));
}

#[test]
fn test_project_source_shadows_global() {
    let project = TestProject::new();
    project
        .cuco()
        .args(["source", "add", "acme", "https://github.com/acme/global.git", "--global"])
        .assert()
        .success();
    project
        .cuco()
        .args(["source", "add", "acme", "https://github.com/acme/project.git"])
        .assert()
        .success();

    project
        .cuco()
        .args(["source", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shadowed by project"));
}

#[test]
fn test_bundle_list() {
    let project = TestProject::with_team_bundle();
    project
        .cuco()
        .args(["bundle", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("team"))
        .stdout(predicate::str::contains("Team helpers"))
        .stdout(predicate::str::contains("installed").not());

    project.cuco().args(["install", "team"]).assert().success();
    project
        .cuco()
        .args(["bundle", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[installed: github 1.0.0]"));
}

#[test]
fn test_install_unknown_bundle_suggests_names() {
    let project = TestProject::with_team_bundle();
    project
        .cuco()
        .args(["install", "teams"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Bundle 'teams' not found"));
}

#[test]
fn test_missing_project_dir_is_an_error() {
    let project = TestProject::new();
    project
        .cuco()
        .args(["--project", "does-not-exist", "source", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_verbose_and_quiet_conflict() {
    let project = TestProject::new();
    project.cuco().args(["-v", "-q", "source", "list"]).assert().failure();
}

#[test]
fn test_list_registry_resources() {
    let project = TestProject::with_team_bundle();
    project
        .cuco()
        .args(["list", "agents"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reviewer"))
        .stdout(predicate::str::contains("agents/reviewer.md"));

    project
        .cuco()
        .args(["list", "skills"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No skills"));
}

#[test]
fn test_add_single_resource_then_update_and_remove() {
    let project = TestProject::with_team_bundle();
    let agent = ".github/agents/reviewer.agent.md";

    project
        .cuco()
        .args(["add", "agent", "reviewer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed bundle 'agent.reviewer'"));
    assert_eq!(project.read_installed(agent), "# reviewer\n\nReview agent v1\n");
    assert!(project.record_path("agent.reviewer").is_file());
    assert!(!project.installed(".github/prompts/triage.prompt.md").exists());

    project.registry().write("agents/reviewer.md", "# {{name}}\n\nReview agent v2\n").unwrap();
    project
        .cuco()
        .args(["add", "agent", "reviewer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already installed; syncing"));
    assert_eq!(project.read_installed(agent), "# reviewer\n\nReview agent v2\n");

    project.cuco().args(["remove", "agent.reviewer"]).assert().success();
    assert!(!project.installed(agent).exists());
    assert!(!project.record_path("agent.reviewer").exists());
}

#[test]
fn test_add_unknown_resource_lists_available() {
    let project = TestProject::with_team_bundle();
    project
        .cuco()
        .args(["add", "agent", "reveiwer"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No agent named 'reveiwer' in the registry"))
        .stderr(predicate::str::contains("Available: reviewer"));

    assert!(!project.installed(".github/agents").exists());
}
