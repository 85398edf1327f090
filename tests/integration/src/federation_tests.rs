//! Federation manifest through registry, server and guarded execution

use std::collections::BTreeSet;
use std::path::PathBuf;

use cerebrum_capabilities::{Error as CapabilityError, Executor, ModuleRegistry, RegistryConfig};
use cerebrum_mcp::CapabilityServer;
use cerebrum_meta::WorkspaceConfig;
use cerebrum_test_utils::workspace::TestWorkspace;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

/// Two modules: `core` in JSON, `docs` in YAML with a restricted root.
fn federation() -> TestWorkspace {
    let ws = TestWorkspace::new();
    ws.write_json(
        "mcp/federation_manifest.json",
        &json!({"modules": [
            {"id": "core", "summary": "Core", "path": "core", "manifest": "capabilities/manifest.json",
             "health": {"commands": [{"name": "doctor", "command": "scripts/doctor.sh"}]}},
            {"id": "docs", "summary": "Docs", "path": "docs", "manifest": "capabilities.yaml", "tags": ["docs"]}
        ]}),
    );
    ws.write_json(
        "core/capabilities/manifest.json",
        &json!({"capabilities": [{
            "id": "core.where",
            "summary": "Print the working directory",
            "entrypoint": "scripts/where.sh",
            "inputs": {"properties": {"label": {"type": "string"}}, "additionalProperties": false},
            "guardrails": {"maxRuntimeSeconds": 20}
        }]}),
    );
    ws.write_script(
        "core/scripts/where.sh",
        "dir=$(pwd)\necho \"$INPUT_LABEL:${dir##*/}:$CAPABILITY_MODULE\"",
    );
    ws.write(
        "docs/capabilities.yaml",
        r#"capabilities:
  - id: docs.build
    summary: Build the docs
    entrypoint: tools/build.sh
    guardrails:
      allowed_entrypoint_roots: [tools]
      allowed_exit_codes: [0, 2]
      max_runtime_seconds: 60
"#,
    );
    ws.write_script("docs/tools/build.sh", "echo built\nexit 2");
    ws
}

fn registry(ws: &TestWorkspace, filter: Option<&[&str]>) -> Result<ModuleRegistry, CapabilityError> {
    let config = RegistryConfig::Federation {
        path: WorkspaceConfig::default().capabilities.federation_manifest,
        filter: filter.map(|ids| ids.iter().map(|id| id.to_string()).collect::<BTreeSet<_>>()),
    };
    ModuleRegistry::from_config(&config, ws.root())
}

fn server(ws: &TestWorkspace) -> CapabilityServer {
    let registry = registry(ws, None).unwrap();
    let executor = Executor::new(registry.root(), &WorkspaceConfig::default().capabilities);
    CapabilityServer::new(registry, executor).unwrap()
}

async fn call_tool(server: &CapabilityServer, name: &str, arguments: Value) -> Value {
    let request = json!({
        "jsonrpc": "2.0", "id": 1, "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    });
    let response: Value =
        serde_json::from_str(&server.handle_message(&request.to_string()).await.unwrap()).unwrap();
    let text = response["result"]["content"][0]["text"].as_str().unwrap().to_string();
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

#[test]
fn test_mixed_format_modules_load() {
    let ws = federation();
    let registry = registry(&ws, None).unwrap();
    assert_eq!(registry.capability_ids(), vec!["core.where", "docs.build"]);

    let health = registry.health_snapshot();
    assert_eq!(health[0].health_commands[0].name, "doctor");
    assert_eq!(health[1].guardrails.allowed_entry_roots, vec!["tools".to_string()]);
    assert_eq!(health[1].guardrails.runtime_range, [60, 60]);
}

#[test]
fn test_duplicate_across_federation_registers_nothing() {
    let ws = federation();
    ws.write(
        "docs/capabilities.yaml",
        "capabilities:\n  - id: core.where\n    entrypoint: tools/build.sh\n",
    );
    let err = registry(&ws, None).unwrap_err();
    assert!(matches!(err, CapabilityError::DuplicateCapability { .. }));
}

#[test]
fn test_entrypoint_escaping_allowed_roots_is_fatal() {
    let ws = federation();
    ws.write_script("docs/elsewhere.sh", "true");
    ws.write(
        "docs/capabilities.yaml",
        "capabilities:\n  - id: docs.build\n    entrypoint: elsewhere.sh\n    guardrails:\n      allowedEntrypointRoots: [tools]\n",
    );
    let err = registry(&ws, Some(&["docs"])).unwrap_err();
    assert!(matches!(err, CapabilityError::EntrypointOutsideRoots { .. }));
}

#[cfg(unix)]
#[tokio::test]
async fn test_capabilities_run_in_module_workdir() {
    let ws = federation();
    let server = server(&ws);

    let outcome = call_tool(&server, "core_where", json!({"label": "here"})).await;
    assert_eq!(outcome["status"], "ok");
    assert_eq!(outcome["stdout"], "here:core:core\n");

    let outcome = call_tool(&server, "docs_build", json!({})).await;
    assert_eq!(outcome["status"], "ok");
    assert_eq!(outcome["exitCode"], 2);
    assert_eq!(outcome["module"], "docs");
}

#[tokio::test]
async fn test_schema_rejection_does_not_spawn() {
    let ws = federation();
    let server = server(&ws);
    let rejected = call_tool(&server, "core_where", json!({"label": "x", "verbose": true})).await;
    let text = rejected.as_str().unwrap();
    assert!(text.starts_with("Invalid arguments for core.where"), "{text}");
}

#[tokio::test]
async fn test_modules_tool_reports_counts() {
    let ws = federation();
    let server = server(&ws);
    let modules = call_tool(&server, "capability_modules", Value::Null).await;
    let entries = modules["modules"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["manifest"], "docs/capabilities.yaml");
    assert_eq!(entries[1]["tags"], json!(["docs"]));
    assert_eq!(
        PathBuf::from(entries[0]["moduleRoot"].as_str().unwrap()).file_name().unwrap(),
        "core"
    );
}
