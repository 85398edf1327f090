//! Capability server
//!
//! Serves one [`ModuleRegistry`] over line-delimited JSON-RPC on stdio.
//! The registry is built once by the caller and owned by the server for the
//! process lifetime.

use std::io::{BufRead, Write};

use cerebrum_capabilities::{Executor, ModuleRegistry, tool_name};
use serde_json::{Value, json};

use crate::protocol::{
    INTERNAL_ERROR, INVALID_PARAMS, InitializeResult, JsonRpcRequest, JsonRpcResponse,
    METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION, ServerCapabilities, ServerInfo,
    ToolCallParams, ToolsCapability,
};
use crate::tools::{
    BUILTIN_TOOLS, HEALTH_TOOL, HELP_TOOL, INDEX_TOOL, MODULES_TOOL, ToolDefinition, ToolResult,
    tool_definitions,
};
use crate::{Error, Result};

pub struct CapabilityServer {
    registry: ModuleRegistry,
    executor: Executor,
    tools: Vec<ToolDefinition>,
}

impl CapabilityServer {
    /// Wrap a registry and its executor.
    ///
    /// Fails when a capability's tool name shadows a built-in tool.
    pub fn new(registry: ModuleRegistry, executor: Executor) -> Result<Self> {
        for (_, capability) in registry.enabled_capabilities() {
            let name = tool_name(&capability.id);
            if BUILTIN_TOOLS.contains(&name.as_str()) {
                return Err(Error::ReservedToolName {
                    capability: capability.id.clone(),
                    tool: name,
                });
            }
        }
        let tools = tool_definitions(&registry);
        Ok(Self {
            registry,
            executor,
            tools,
        })
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Serve requests from stdin until it closes.
    pub async fn run(&self) -> Result<()> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        tracing::info!(tools = self.tools.len(), "Capability server ready, listening on stdio");

        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            tracing::debug!(request = %line, "Received message");

            let response = match self.handle_message(&line).await {
                Ok(response) => response,
                Err(e) => serde_json::to_string(&JsonRpcResponse::error(
                    None,
                    INTERNAL_ERROR,
                    format!("Internal error: {e}"),
                ))?,
            };
            if !response.is_empty() {
                writeln!(stdout, "{response}")?;
                stdout.flush()?;
            }
        }

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle one JSON-RPC message; notifications yield an empty string.
    pub async fn handle_message(&self, message: &str) -> Result<String> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(request) => request,
            Err(e) => {
                let response = JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {e}"));
                return Ok(serde_json::to_string(&response)?);
            }
        };

        let notification = request.id.is_none();
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id)?,
            "initialized" | "notifications/initialized" => return Ok(String::new()),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await?,
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        if notification {
            tracing::debug!(method = %request.method, "Notification handled without response");
            return Ok(String::new());
        }
        Ok(serde_json::to_string(&response)?)
    }

    fn handle_initialize(&self, id: Option<Value>) -> Result<JsonRpcResponse> {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability { list_changed: false },
            },
            server_info: ServerInfo {
                name: "cerebrum-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };
        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": self.tools }))
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        let params: ToolCallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return Ok(JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid tool call params: {e}"),
                ));
            }
        };

        let result = match self.call_tool(&params.name, &params.arguments).await {
            Ok(result) => result,
            Err(Error::UnknownTool(name)) => {
                return Ok(JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Unknown tool: {name}"),
                ));
            }
            Err(e) => ToolResult::error(e.to_string()),
        };
        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }

    /// Run a built-in or capability tool.
    ///
    /// Argument problems come back as an error [`ToolResult`]; only an
    /// unknown tool name is an `Err`.
    pub async fn call_tool(&self, name: &str, arguments: &Value) -> Result<ToolResult> {
        match name {
            INDEX_TOOL => pretty(&json!({ "capabilities": self.registry.capability_meta() })),
            MODULES_TOOL => pretty(&json!({ "modules": self.registry.module_index() })),
            HEALTH_TOOL => pretty(&json!({ "modules": self.registry.health_snapshot() })),
            HELP_TOOL => {
                let Some(capability_id) = arguments.get("capability_id").and_then(Value::as_str)
                else {
                    return Ok(ToolResult::error("capability_id (string) is required"));
                };
                match self
                    .registry
                    .capability_meta()
                    .into_iter()
                    .find(|meta| meta.id == capability_id)
                {
                    Some(meta) => pretty(&meta),
                    None => pretty(&json!({ "error": format!("Capability '{capability_id}' not found") })),
                }
            }
            _ => self.call_capability(name, arguments).await,
        }
    }

    async fn call_capability(&self, name: &str, arguments: &Value) -> Result<ToolResult> {
        let (module, capability) = self
            .registry
            .capability_by_tool(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;

        let arguments = match capability.argument_schema().validate(arguments) {
            Ok(arguments) => arguments,
            Err(e) => {
                tracing::warn!(capability = %capability.id, error = %e, "Rejected tool arguments");
                return Ok(ToolResult::error(format!(
                    "Invalid arguments for {}: {e}",
                    capability.id
                )));
            }
        };

        let outcome = self.executor.invoke(module, capability, &arguments).await;
        pretty(&outcome)
    }
}

fn pretty<T: serde::Serialize>(value: &T) -> Result<ToolResult> {
    Ok(ToolResult::text(serde_json::to_string_pretty(value)?))
}
