use predicates::prelude::*;
use std::fs;

use crate::common::TestProject;

const AGENT: &str = ".github/agents/reviewer.agent.md";

fn installed_team() -> TestProject {
    let project = TestProject::with_team_bundle();
    project.cuco().args(["install", "team"]).assert().success();
    project
}

#[test]
fn test_status_after_install_is_up_to_date() {
    let project = installed_team();
    project
        .cuco()
        .args(["status", "team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Up to date"));
}

#[test]
fn test_upstream_update_is_synced() {
    let project = installed_team();
    project.registry().write("agents/reviewer.md", "# {{name}}\n\nReview agent v2\n").unwrap();

    project
        .cuco()
        .args(["status", "team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("upstream updated"));
    // status is read-only
    assert!(project.read_installed(AGENT).contains("v1"));

    project
        .cuco()
        .args(["sync", "team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("updated"));
    assert_eq!(project.read_installed(AGENT), "# reviewer\n\nReview agent v2\n");

    project
        .cuco()
        .args(["status", "team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Up to date"));
}

#[test]
fn test_local_edit_survives_sync() {
    let project = installed_team();
    project.write_installed(AGENT, "my own reviewer\n");

    project
        .cuco()
        .args(["sync", "team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("locally modified"));
    assert_eq!(project.read_installed(AGENT), "my own reviewer\n");

    let record = fs::read_to_string(project.record_path("team")).unwrap();
    assert!(record.contains("local_override = true"));

    project
        .cuco()
        .args(["status", "team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Up to date"));
}

#[test]
fn test_conflict_is_deferred_then_resolved_upstream() {
    let project = installed_team();
    project.write_installed(AGENT, "my own reviewer\n");
    project.registry().write("agents/reviewer.md", "# {{name}}\n\nReview agent v2\n").unwrap();

    project
        .cuco()
        .args(["status", "team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("conflicting"))
        .stdout(predicate::str::contains("1 conflict(s)"));

    // stdin is not a terminal, so the conflict is left unresolved.
    project
        .cuco()
        .args(["sync", "team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unresolved"))
        .stdout(predicate::str::contains("--take-upstream"));
    assert_eq!(project.read_installed(AGENT), "my own reviewer\n");

    project
        .cuco()
        .args(["sync", "team", "--take-upstream"])
        .assert()
        .success()
        .stdout(predicate::str::contains("took upstream"));
    assert_eq!(project.read_installed(AGENT), "# reviewer\n\nReview agent v2\n");

    project
        .cuco()
        .args(["status", "team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Up to date"));
}

#[test]
fn test_conflict_kept_local_stays_quiet() {
    let project = installed_team();
    project.write_installed(AGENT, "my own reviewer\n");
    project.registry().write("agents/reviewer.md", "v2\n").unwrap();

    project
        .cuco()
        .args(["sync", "team", "--keep-local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kept local"));
    assert_eq!(project.read_installed(AGENT), "my own reviewer\n");

    project
        .cuco()
        .args(["status", "team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Up to date"));

    // A later upstream change conflicts again.
    project.registry().write("agents/reviewer.md", "v3\n").unwrap();
    project
        .cuco()
        .args(["status", "team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("conflicting"));
}

#[test]
fn test_policy_flags_are_exclusive() {
    let project = installed_team();
    project
        .cuco()
        .args(["sync", "team", "--keep-local", "--take-upstream"])
        .assert()
        .failure();
}

#[test]
fn test_added_and_removed_entries() {
    let project = installed_team();
    project.registry().write("agents/helper.md", "helper\n").unwrap();
    project
        .registry()
        .bundle(
            "team",
            r#"{
              "name": "team",
              "version": "1.1.0",
              "dependencies": {
                "agents": [
                  {"name": "reviewer", "type": "reference", "source": "agents/reviewer.md"},
                  {"name": "helper", "type": "reference", "source": "agents/helper.md"}
                ]
              },
              "copilotInstructions": {"type": "inline", "path": "instructions.md"}
            }"#,
        )
        .unwrap();

    project
        .cuco()
        .args(["status", "team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("new"))
        .stdout(predicate::str::contains("orphaned"));

    project.cuco().args(["sync", "team"]).assert().success();

    assert_eq!(project.read_installed(".github/agents/helper.agent.md"), "helper\n");
    // Orphaned files stay on disk but leave the record.
    assert!(project.installed(".github/prompts/triage.prompt.md").is_file());
    let record = fs::read_to_string(project.record_path("team")).unwrap();
    assert!(!record.contains("triage"));
    assert!(record.contains("bundle_version = \"1.1.0\""));
}

#[test]
fn test_sync_without_record_treats_files_as_conflicts() {
    let project = installed_team();
    fs::remove_file(project.record_path("team")).unwrap();

    project
        .cuco()
        .args(["status", "team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No install record"))
        .stdout(predicate::str::contains("conflicting"));

    project.cuco().args(["sync", "team", "--take-upstream"]).assert().success();
    assert!(project.record_path("team").is_file());
}
