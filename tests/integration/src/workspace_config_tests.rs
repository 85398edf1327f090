//! Every subsystem honours paths from `.cerebrum/config.toml`

use cerebrum_agents::{AgentFoundry, AgentRequest};
use cerebrum_evergreen::{Evergreen, EvergreenOutcome, RunOptions};
use cerebrum_meta::WorkspaceConfig;
use cerebrum_test_utils::workspace::TestWorkspace;
use pretty_assertions::assert_eq;
use serde_json::json;

fn configured_workspace() -> TestWorkspace {
    let ws = TestWorkspace::new();
    ws.write(
        ".cerebrum/config.toml",
        r#"
[evergreen]
project_dir = "templates"
validate_command = ["./check.sh"]
artifact_dir = "out/runs"
state_file = "out/state.json"
run_prefix = "nightly"

[evergreen.watch]
catalog = "templates/catalog.json"

[agents]
docs_root = "docs"
registry = "docs/registry.json"
"#,
    );
    ws.write_json("templates/catalog.json", &json!({"templates": []}));
    ws.write_script("templates/check.sh", "echo checked \"$@\"");
    ws
}

#[test]
fn test_config_file_overrides_defaults() {
    let ws = configured_workspace();
    let config = WorkspaceConfig::load(ws.root());
    assert_eq!(config.evergreen.run_prefix, "nightly");
    assert_eq!(config.evergreen.watch.len(), 1);
    assert_eq!(config.evergreen.probe.retention_hours, 24);
    assert_eq!(config.capabilities.shell, "bash");
}

#[test]
fn test_unparseable_config_falls_back_to_defaults() {
    let ws = TestWorkspace::new();
    ws.write(".cerebrum/config.toml", "[evergreen\nbroken");
    assert_eq!(WorkspaceConfig::load(ws.root()), WorkspaceConfig::default());
}

#[cfg(unix)]
#[test]
fn test_evergreen_uses_configured_paths() {
    let ws = configured_workspace();
    let config = WorkspaceConfig::load(ws.root());
    let evergreen = Evergreen::new(ws.root(), config.evergreen);

    let (outcome, _) = evergreen
        .run(&RunOptions {
            templates: vec!["web".into()],
            ..RunOptions::default()
        })
        .unwrap();
    let EvergreenOutcome::Ran(summary) = outcome else {
        panic!("expected a run, got {outcome:?}");
    };
    assert!(summary.run_id.starts_with("nightly-"));
    assert!(summary.log_path.starts_with("out/runs/"));
    assert!(ws.read(&summary.log_path).contains("checked --template web"));

    let state = ws.read_json("out/state.json");
    assert!(state["hashes"]["catalog"].as_str().unwrap().starts_with("sha256:"));
}

#[test]
fn test_agents_use_configured_docs_root() {
    let ws = configured_workspace();
    let config = WorkspaceConfig::load(ws.root());
    let foundry = AgentFoundry::from_config(ws.root(), &config.agents);

    foundry
        .execute(AgentRequest {
            agent_id: "watcher-01".into(),
            role: "monitor".into(),
            description: "watches build queue".into(),
            ..AgentRequest::default()
        })
        .unwrap();

    ws.assert_file_exists("docs/agents/watcher-01/README.md");
    assert_eq!(ws.read_json("docs/registry.json")["agents"]["watcher-01"]["status"], "draft");
}
