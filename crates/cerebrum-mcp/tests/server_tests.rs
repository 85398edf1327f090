//! Protocol handling against a real registry

use std::path::PathBuf;

use cerebrum_capabilities::{Executor, ModuleRegistry, RegistryConfig};
use cerebrum_mcp::{CapabilityServer, Error};
use cerebrum_meta::CapabilitiesConfig;
use cerebrum_test_utils::workspace::TestWorkspace;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn workspace(capabilities: Value) -> TestWorkspace {
    let ws = TestWorkspace::new();
    ws.write_script("scripts/echo.sh", "echo \"path=$INPUT_PATH\"");
    ws.write_json("capabilities/manifest.json", &json!({ "capabilities": capabilities }));
    ws
}

fn server(ws: &TestWorkspace) -> Result<CapabilityServer, Error> {
    let config = RegistryConfig::Single {
        manifest: PathBuf::from("capabilities/manifest.json"),
        module_id: Some("demo".into()),
    };
    let registry = ModuleRegistry::from_config(&config, ws.root())?;
    let executor = Executor::new(registry.root(), &CapabilitiesConfig::default());
    CapabilityServer::new(registry, executor)
}

fn echo_capability() -> Value {
    json!([{
        "id": "demo.echo",
        "summary": "Echo a path",
        "entrypoint": "scripts/echo.sh",
        "inputs": {"properties": {"path": {}}, "required": ["path"], "additionalProperties": false}
    }])
}

async fn call(server: &CapabilityServer, request: Value) -> Value {
    let response = server.handle_message(&request.to_string()).await.unwrap();
    serde_json::from_str(&response).unwrap()
}

fn tool_text(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap()
}

#[tokio::test]
async fn test_initialize_reports_server_info() {
    let ws = workspace(echo_capability());
    let server = server(&ws).unwrap();
    let response = call(
        &server,
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
    )
    .await;
    assert_eq!(response["result"]["serverInfo"]["name"], "cerebrum-mcp");
    assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
}

#[tokio::test]
async fn test_notification_has_no_response() {
    let ws = workspace(echo_capability());
    let server = server(&ws).unwrap();
    let response = server
        .handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .await
        .unwrap();
    assert!(response.is_empty());
}

#[tokio::test]
async fn test_tools_list_includes_capabilities_and_builtins() {
    let ws = workspace(echo_capability());
    let server = server(&ws).unwrap();
    let response = call(&server, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;

    let tools = response["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        vec![
            "demo_echo",
            "capabilities_index",
            "capability_help",
            "capability_modules",
            "capability_health"
        ]
    );
    assert_eq!(tools[0]["description"], "Echo a path");
    assert_eq!(tools[0]["inputSchema"]["type"], "object");
    assert_eq!(tools[0]["inputSchema"]["required"], json!(["path"]));
}

#[tokio::test]
async fn test_unknown_method() {
    let ws = workspace(echo_capability());
    let server = server(&ws).unwrap();
    let response = call(&server, json!({"jsonrpc": "2.0", "id": 3, "method": "resources/list"})).await;
    assert_eq!(response["error"]["code"], -32601);
}

#[tokio::test]
async fn test_unknown_notification_gets_no_reply() {
    let ws = workspace(echo_capability());
    let server = server(&ws).unwrap();
    let message = json!({"jsonrpc": "2.0", "method": "notifications/cancelled"}).to_string();
    assert_eq!(server.handle_message(&message).await.unwrap(), "");
}

#[tokio::test]
async fn test_malformed_message_is_parse_error() {
    let ws = workspace(echo_capability());
    let server = server(&ws).unwrap();
    let response: Value = serde_json::from_str(&server.handle_message("{oops").await.unwrap()).unwrap();
    assert_eq!(response["error"]["code"], -32700);
}

#[cfg(unix)]
#[tokio::test]
async fn test_call_capability_with_valid_arguments() {
    let ws = workspace(echo_capability());
    let server = server(&ws).unwrap();
    let response = call(
        &server,
        json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call",
               "params": {"name": "demo_echo", "arguments": {"path": "docs"}}}),
    )
    .await;

    assert!(response["result"].get("isError").is_none());
    let outcome: Value = serde_json::from_str(tool_text(&response)).unwrap();
    assert_eq!(outcome["status"], "ok");
    assert_eq!(outcome["exitCode"], 0);
    assert_eq!(outcome["stdout"], "path=docs\n");
    assert_eq!(outcome["module"], "demo");
}

#[tokio::test]
async fn test_undeclared_argument_is_rejected() {
    let ws = workspace(echo_capability());
    let server = server(&ws).unwrap();
    let response = call(
        &server,
        json!({"jsonrpc": "2.0", "id": 5, "method": "tools/call",
               "params": {"name": "demo_echo", "arguments": {"path": "a", "extra": 1}}}),
    )
    .await;

    assert_eq!(response["result"]["isError"], true);
    let text = tool_text(&response);
    assert!(text.contains("demo.echo"), "{text}");
    assert!(text.contains("extra"), "{text}");
}

#[tokio::test]
async fn test_missing_required_argument_is_rejected() {
    let ws = workspace(echo_capability());
    let server = server(&ws).unwrap();
    let response = call(
        &server,
        json!({"jsonrpc": "2.0", "id": 6, "method": "tools/call", "params": {"name": "demo_echo"}}),
    )
    .await;
    assert_eq!(response["result"]["isError"], true);
    assert!(tool_text(&response).contains("path"));
}

#[tokio::test]
async fn test_unknown_tool_is_invalid_params() {
    let ws = workspace(echo_capability());
    let server = server(&ws).unwrap();
    let response = call(
        &server,
        json!({"jsonrpc": "2.0", "id": 7, "method": "tools/call", "params": {"name": "nope"}}),
    )
    .await;
    assert_eq!(response["error"]["code"], -32602);
}

#[tokio::test]
async fn test_introspection_tools() {
    let ws = workspace(echo_capability());
    let server = server(&ws).unwrap();

    let index = server.call_tool("capabilities_index", &Value::Null).await.unwrap();
    let index: Value = serde_json::from_str(index.first_text().unwrap()).unwrap();
    assert_eq!(index["capabilities"][0]["id"], "demo.echo");
    assert_eq!(index["capabilities"][0]["manifest"], "capabilities/manifest.json");

    let help = server
        .call_tool("capability_help", &json!({"capability_id": "demo.echo"}))
        .await
        .unwrap();
    let help: Value = serde_json::from_str(help.first_text().unwrap()).unwrap();
    assert_eq!(help["module"], "demo");

    let missing = server
        .call_tool("capability_help", &json!({"capability_id": "demo.absent"}))
        .await
        .unwrap();
    let missing: Value = serde_json::from_str(missing.first_text().unwrap()).unwrap();
    assert_eq!(missing["error"], "Capability 'demo.absent' not found");

    let modules = server.call_tool("capability_modules", &Value::Null).await.unwrap();
    let modules: Value = serde_json::from_str(modules.first_text().unwrap()).unwrap();
    assert_eq!(modules["modules"][0]["capabilityEnabled"], 1);

    let health = server.call_tool("capability_health", &Value::Null).await.unwrap();
    let health: Value = serde_json::from_str(health.first_text().unwrap()).unwrap();
    assert_eq!(health["modules"][0]["status"], "ready");
    assert_eq!(health["modules"][0]["guardrails"]["runtimeRange"], json!([300, 300]));
}

#[test]
fn test_capability_shadowing_builtin_is_rejected() {
    let ws = workspace(json!([{"id": "capability.health", "entrypoint": "scripts/echo.sh"}]));
    let err = server(&ws).err().unwrap();
    assert!(matches!(err, Error::ReservedToolName { ref tool, .. } if tool == "capability_health"));
}
