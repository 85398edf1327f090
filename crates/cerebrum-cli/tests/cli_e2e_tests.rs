//! CLI end-to-end tests that invoke the compiled `cerebrum` binary.

use assert_cmd::Command;
use cerebrum_test_utils::{git, workspace::TestWorkspace};
use predicates::prelude::*;
use serde_json::{Value, json};

fn cerebrum(ws: &TestWorkspace) -> Command {
    let mut cmd = Command::cargo_bin("cerebrum").unwrap();
    cmd.arg("--root")
        .arg(ws.root())
        .env("NO_COLOR", "1")
        .env_remove("CEREBRUM_LOG")
        .env_remove("RUST_LOG");
    cmd
}

/// Stdout parsed as one pretty-printed JSON document.
fn json_stdout(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

fn evergreen_workspace() -> TestWorkspace {
    let ws = TestWorkspace::new();
    ws.write_json("frontiers/catalog.json", &json!({"templates": ["web"]}));
    ws.write_json("cortex/data/toolchain-manifest.json", &json!({"toolchains": {}}));
    ws.write_script(
        "frontiers/.dev/validate-templates.sh",
        r#"echo "validating $*"
exit "$(cat .exit-code 2>/dev/null || echo 0)""#,
    );
    ws
}

#[test]
fn test_help_exits_zero() {
    Command::cargo_bin("cerebrum")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("evergreen"))
        .stdout(predicate::str::contains("health"))
        .stdout(predicate::str::contains("agent"));
}

#[test]
fn test_missing_root_is_user_error() {
    let ws = TestWorkspace::new();
    Command::cargo_bin("cerebrum")
        .unwrap()
        .args(["--root"])
        .arg(ws.path("absent"))
        .args(["agent", "list"])
        .env("NO_COLOR", "1")
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("error: Workspace root not found"));
}

#[cfg(unix)]
#[test]
fn test_evergreen_check_only_reports_pending_run() {
    let ws = evergreen_workspace();
    let output = cerebrum(&ws).args(["evergreen", "--check-only"]).output().unwrap();
    assert!(output.status.success());

    let payload = json_stdout(&output);
    assert_eq!(payload["needsRun"], true);
    assert_eq!(payload["status"], "needs-run");
    assert_eq!(payload["statePath"], Value::Null);
}

#[cfg(unix)]
#[test]
fn test_evergreen_runs_then_skips() {
    let ws = evergreen_workspace();
    let output = cerebrum(&ws).arg("evergreen").output().unwrap();
    assert!(output.status.success());
    assert_eq!(json_stdout(&output)["status"], "success");

    let output = cerebrum(&ws).arg("evergreen").output().unwrap();
    assert!(output.status.success());
    let payload = json_stdout(&output);
    assert_eq!(payload["status"], "skipped");
    assert_eq!(
        payload["message"],
        "No watched changes detected; use --force to run anyway."
    );
}

#[cfg(unix)]
#[test]
fn test_evergreen_propagates_validation_exit_code() {
    let ws = evergreen_workspace();
    ws.write("frontiers/.exit-code", "3");
    let output = cerebrum(&ws)
        .args(["evergreen", "--templates", "web", "--force-rebuild"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));

    let payload = json_stdout(&output);
    assert_eq!(payload["status"], "failed");
    assert_eq!(payload["templates"], json!(["web"]));
    assert_eq!(payload["forceRebuild"], true);
}

#[test]
fn test_evergreen_without_project_fails() {
    let ws = TestWorkspace::new();
    cerebrum(&ws)
        .arg("evergreen")
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("error:"));
}

#[test]
fn test_health_clean_repository() {
    let ws = TestWorkspace::new();
    git::real_git_repo_with_commit(ws.root());

    cerebrum(&ws)
        .args(["health", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("workspace: clean (branch main, HEAD "))
        .stdout(predicate::str::contains("all submodules clean"))
        .stdout(predicate::str::contains("\"submodules\": []"));
}

#[test]
fn test_health_reports_dirty_root() {
    let ws = TestWorkspace::new();
    git::real_git_repo_with_commit(ws.root());
    ws.write("notes.txt", "scratch");

    cerebrum(&ws)
        .arg("health")
        .assert()
        .success()
        .stdout(predicate::str::contains("workspace: dirty"))
        .stdout(predicate::str::contains("root changes:"))
        .stdout(predicate::str::contains("notes.txt"));
}

#[test]
fn test_agent_list_empty() {
    let ws = TestWorkspace::new();
    cerebrum(&ws)
        .args(["agent", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No agents registered yet"));
}

#[test]
fn test_agent_scaffold_then_list() {
    let ws = TestWorkspace::new();
    cerebrum(&ws)
        .args([
            "agent",
            "scaffold",
            "--name",
            "watcher-01",
            "--role",
            "monitor",
            "--description",
            "watches build queue",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scaffolded agent watcher-01 (Created)"))
        .stdout(predicate::str::contains("agents/docs/agents/watcher-01/README.md"))
        .stdout(predicate::str::contains("registry: agents/docs/agent-registry.json"));

    cerebrum(&ws)
        .args([
            "agent",
            "scaffold",
            "--name",
            "watcher-01",
            "--role",
            "monitor",
            "--description",
            "watches build queue",
            "--title",
            "Queue Watcher",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("(Updated)"));

    cerebrum(&ws)
        .args(["agent", "list"])
        .assert()
        .success()
        .stdout("watcher-01\tdraft\tQueue Watcher\n");
}

#[test]
fn test_agent_scaffold_rejects_bad_capabilities_file() {
    let ws = TestWorkspace::new();
    ws.write_json("caps.json", &json!({"items": []}));
    cerebrum(&ws)
        .args([
            "agent",
            "scaffold",
            "--name",
            "watcher-01",
            "--role",
            "monitor",
            "--description",
            "d",
            "--capabilities",
            "caps.json",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Capabilities file must be a list or include 'capabilities'",
        ));
    ws.assert_file_not_exists("agents/docs/agent-registry.json");
}

#[test]
fn test_agent_scaffold_rejects_bad_slug() {
    let ws = TestWorkspace::new();
    cerebrum(&ws)
        .args([
            "agent",
            "scaffold",
            "--name",
            "Watcher One",
            "--role",
            "monitor",
            "--description",
            "d",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("kebab-case"));
}
