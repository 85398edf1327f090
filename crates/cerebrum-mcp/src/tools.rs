//! Tool definitions and results
//!
//! Every enabled capability becomes one tool named after its id with `.`
//! replaced by `_`. Four built-in tools serve introspection:
//!
//! - `capabilities_index` - metadata of every enabled capability
//! - `capability_help` - metadata of one capability
//! - `capability_modules` - loaded modules with capability counts
//! - `capability_health` - per-module guardrail summary

use cerebrum_capabilities::{ModuleRegistry, tool_name};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const INDEX_TOOL: &str = "capabilities_index";
pub const HELP_TOOL: &str = "capability_help";
pub const MODULES_TOOL: &str = "capability_modules";
pub const HEALTH_TOOL: &str = "capability_health";

/// Names no capability may map onto
pub const BUILTIN_TOOLS: [&str; 4] = [INDEX_TOOL, HELP_TOOL, MODULES_TOOL, HEALTH_TOOL];

/// Tool definition for the `tools/list` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Result from a tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// Content types for tool results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolResult {
    /// Create a successful text result
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: content.into(),
            }],
            is_error: None,
        }
    }

    /// Create an error result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: Some(true),
        }
    }

    /// Text of the first content block.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|ToolContent::Text { text }| text.as_str())
    }
}

fn empty_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

fn builtin_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: INDEX_TOOL.to_string(),
            description: "List enabled capabilities with metadata".to_string(),
            input_schema: empty_schema(),
        },
        ToolDefinition {
            name: HELP_TOOL.to_string(),
            description: "Describe a specific capability".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "capability_id": {"type": "string", "description": "Capability identifier"}
                },
                "required": ["capability_id"],
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: MODULES_TOOL.to_string(),
            description: "List loaded capability modules".to_string(),
            input_schema: empty_schema(),
        },
        ToolDefinition {
            name: HEALTH_TOOL.to_string(),
            description: "Summarise module guardrails and readiness".to_string(),
            input_schema: empty_schema(),
        },
    ]
}

/// Capability tools in registry order followed by the built-in tools.
pub fn tool_definitions(registry: &ModuleRegistry) -> Vec<ToolDefinition> {
    let mut tools: Vec<ToolDefinition> = registry
        .enabled_capabilities()
        .map(|(_, capability)| ToolDefinition {
            name: tool_name(&capability.id),
            description: capability.summary.clone(),
            input_schema: capability.argument_schema().normalized().clone(),
        })
        .collect();
    tools.extend(builtin_definitions());
    tools
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_result_serializes_is_error() {
        let json = serde_json::to_value(ToolResult::error("boom")).unwrap();
        assert_eq!(json["isError"], true);
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "boom");
    }

    #[test]
    fn text_result_omits_is_error() {
        let json = serde_json::to_value(ToolResult::text("ok")).unwrap();
        assert!(json.get("isError").is_none());
    }

    #[test]
    fn builtins_have_object_schemas() {
        for tool in builtin_definitions() {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            assert!(BUILTIN_TOOLS.contains(&tool.name.as_str()));
        }
    }
}
