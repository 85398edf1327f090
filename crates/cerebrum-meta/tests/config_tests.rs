use std::path::PathBuf;

use cerebrum_meta::{CONFIG_PATH, WorkspaceConfig};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::TempDir;

fn workspace_with_config(content: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(CONFIG_PATH);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
    temp
}

#[test]
fn test_missing_config_is_default() {
    let temp = TempDir::new().unwrap();
    assert_eq!(WorkspaceConfig::load(temp.path()), WorkspaceConfig::default());
}

#[rstest]
#[case::empty("")]
#[case::not_toml("evergreen = [unterminated")]
#[case::wrong_type("[evergreen]\nrun_prefix = 42\n")]
fn test_unusable_config_falls_back(#[case] content: &str) {
    let temp = workspace_with_config(content);
    assert_eq!(WorkspaceConfig::load(temp.path()), WorkspaceConfig::default());
}

#[test]
fn test_partial_sections_keep_other_defaults() {
    let temp = workspace_with_config(
        r#"
[capabilities]
python = "python3.12"

[evergreen.probe]
retention_hours = 6
"#,
    );
    let config = WorkspaceConfig::load(temp.path());

    assert_eq!(config.capabilities.python, "python3.12");
    assert_eq!(config.capabilities.shell, "bash");
    assert_eq!(config.evergreen.probe.retention_hours, 6);
    assert_eq!(config.evergreen.probe.installer, "uv");
    assert_eq!(config.evergreen.project_dir, PathBuf::from("frontiers"));
    assert_eq!(config.agents.docs_root, PathBuf::from("agents/docs"));
}

#[test]
fn test_watch_table_replaces_default_targets() {
    let temp = workspace_with_config("[evergreen.watch]\nschema = \"schemas/main.json\"\n");
    let config = WorkspaceConfig::load(temp.path());

    assert_eq!(config.evergreen.watch.len(), 1);
    assert_eq!(config.evergreen.watch["schema"], PathBuf::from("schemas/main.json"));
}
