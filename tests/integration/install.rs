use predicates::prelude::*;
use std::fs;

use crate::common::TestProject;

#[test]
fn test_fresh_install_with_git_source() {
    let project = TestProject::with_team_bundle();
    let acme = project.source_repo("acme");
    acme.write("skills/review/SKILL.md", "# {{NAME}}\n")
        .unwrap()
        .write("skills/review/scripts/check.sh", "echo {{name}}\n")
        .unwrap()
        .commit("Add review skill")
        .unwrap();

    project.registry().bundle(
        "review",
        r#"{
          "name": "review",
          "version": "0.2.0",
          "dependencies": {
            "agents": [{"name": "codeReviewer", "type": "reference", "source": "agents/reviewer.md"}],
            "skills": [{"name": "review", "type": "custom", "source_name": "acme", "source": "skills/review"}]
          }
        }"#,
    ).unwrap();

    project.cuco().args(["source", "add", "acme", &acme.url()]).assert().success();
    project
        .cuco()
        .args(["install", "review"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed bundle 'review' (2 written, 0 unchanged)"));

    assert_eq!(
        project.read_installed(".github/agents/codeReviewer.agent.md"),
        "# code-reviewer\n\nReview agent v1\n"
    );
    assert_eq!(project.read_installed(".github/skills/review/SKILL.md"), "# REVIEW\n");
    assert_eq!(project.read_installed(".github/skills/review/scripts/check.sh"), "echo review\n");

    let record = fs::read_to_string(project.record_path("review")).unwrap();
    assert!(record.starts_with("# Auto-generated by cuco"));
    assert!(record.contains("bundle = \"review\""));
    assert!(record.contains("path = \"skills/review\""));
    assert!(record.contains("source_name = \"acme\""));
    assert!(record.contains("upstream_checksum = \"sha256:"));
}

#[test]
fn test_install_layout_per_engine() {
    let project = TestProject::with_team_bundle();
    fs::create_dir_all(project.installed(".claude")).unwrap();

    project.cuco().args(["install", "team"]).assert().success();

    assert!(project.installed(".claude/agents/reviewer.md").is_file());
    assert!(project.installed(".claude/commands/triage.md").is_file());
    assert_eq!(project.read_installed(".claude/CLAUDE.md"), "Team instructions\n");
    assert!(project.installed(".claude/.cuco-bundles/team.lock").is_file());
    assert!(!project.installed(".github").exists());
}

#[test]
fn test_install_forced_engine_and_bundle_path() {
    let project = TestProject::with_team_bundle();
    let bundle_dir = project.registry().path().join("bundles/team");

    project
        .cuco()
        .args(["install", bundle_dir.to_str().unwrap(), "--engine", "cuco"])
        .assert()
        .success();

    assert!(project.installed(".cuco/agents/reviewer.agent.md").is_file());
    assert!(project.installed(".cuco/prompts/triage.prompt.md").is_file());
    assert!(project.installed(".cuco/instructions.md").is_file());
}

#[test]
fn test_reinstall_is_idempotent() {
    let project = TestProject::with_team_bundle();
    project.cuco().args(["install", "team"]).assert().success();

    let agent = project.read_installed(".github/agents/reviewer.agent.md");
    let record = fs::read_to_string(project.record_path("team")).unwrap();

    project
        .cuco()
        .args(["install", "team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already installed; syncing"));

    assert_eq!(project.read_installed(".github/agents/reviewer.agent.md"), agent);
    assert_eq!(fs::read_to_string(project.record_path("team")).unwrap(), record);
}

#[test]
fn test_failed_write_reports_partial_install() {
    let project = TestProject::with_team_bundle();
    fs::create_dir_all(project.installed(".github")).unwrap();
    // A file where the prompts directory should go.
    fs::write(project.installed(".github/prompts"), "in the way").unwrap();

    project
        .cuco()
        .args(["install", "team"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Partially installed"))
        .stdout(predicate::str::contains("(not written)"))
        .stderr(predicate::str::contains("triage"));

    assert!(project.installed(".github/agents/reviewer.agent.md").is_file());
    assert!(!project.installed(".github/copilot-instructions.md").exists());
    assert_eq!(project.read_installed(".github/prompts"), "in the way");

    let record = fs::read_to_string(project.record_path("team")).unwrap();
    assert!(record.contains("name = \"reviewer\""));
    assert!(!record.contains("name = \"triage\""));
}

#[test]
fn test_unresolvable_bundle_writes_nothing() {
    let project = TestProject::with_team_bundle();
    project.registry().bundle(
        "broken",
        r#"{
          "name": "broken",
          "version": "1.0.0",
          "dependencies": {
            "agents": [
              {"name": "reviewer", "type": "reference", "source": "agents/reviewer.md"},
              {"name": "ghost", "type": "custom", "source_name": "nowhere", "source": "agents/ghost.md"}
            ]
          }
        }"#,
    ).unwrap();

    project
        .cuco()
        .args(["install", "broken"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown source 'nowhere'"))
        .stderr(predicate::str::contains("ghost"));

    assert!(!project.installed(".github/agents/reviewer.agent.md").exists());
    assert!(!project.record_path("broken").exists());
}

#[test]
fn test_missing_registry_file_names_the_entry() {
    let project = TestProject::new();
    project.registry().bundle(
        "thin",
        r#"{
          "name": "thin",
          "version": "1.0.0",
          "dependencies": {
            "prompts": [{"name": "absent", "type": "reference", "source": "prompts/absent.md"}]
          }
        }"#,
    ).unwrap();

    project
        .cuco()
        .args(["install", "thin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent"));
}

#[test]
fn test_untracked_file_needs_force() {
    let project = TestProject::with_team_bundle();
    fs::create_dir_all(project.installed(".github/agents")).unwrap();
    project.write_installed(".github/agents/reviewer.agent.md", "hand written\n");

    project.cuco().args(["install", "team"]).assert().failure();
    assert_eq!(project.read_installed(".github/agents/reviewer.agent.md"), "hand written\n");

    project.cuco().args(["install", "team", "--force"]).assert().success();
    assert_eq!(
        project.read_installed(".github/agents/reviewer.agent.md"),
        "# reviewer\n\nReview agent v1\n"
    );
}

#[test]
fn test_reinstall_fails_when_a_resource_cannot_sync() {
    let project = TestProject::with_team_bundle();
    project.cuco().args(["install", "team"]).assert().success();

    project.registry().write("agents/reviewer.md", "# {{name}}\n\nReview agent v2\n").unwrap();
    fs::remove_dir_all(project.installed(".github/prompts")).unwrap();
    fs::write(project.installed(".github/prompts"), "in the way").unwrap();

    project
        .cuco()
        .args(["status", "team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unreadable"));

    project
        .cuco()
        .args(["install", "team", "--force"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("already installed; syncing"))
        .stderr(predicate::str::contains("failed to sync"));

    // The other resources are still brought up to date.
    assert_eq!(
        project.read_installed(".github/agents/reviewer.agent.md"),
        "# reviewer\n\nReview agent v2\n"
    );
    let record = fs::read_to_string(project.record_path("team")).unwrap();
    assert!(record.contains("name = \"triage\""));
}
