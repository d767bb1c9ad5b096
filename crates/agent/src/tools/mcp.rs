//! Remote automation tools exposed to the model

use async_trait::async_trait;
use ops_assistant_mcp::{McpError, ToolClient, ToolDescriptor};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::{ToolError, ToolRegistry, ToolTrait};
use crate::retry::{RetryPolicy, RetryingTool};

/// One remote tool, forwarded to the tool service
pub struct McpTool {
    descriptor: ToolDescriptor,
    client: Arc<dyn ToolClient>,
}

impl McpTool {
    pub fn new(descriptor: ToolDescriptor, client: Arc<dyn ToolClient>) -> Self {
        Self { descriptor, client }
    }

    pub fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn arguments(&self, args: Value) -> Result<Map<String, Value>, McpError> {
        match args {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            other => Err(McpError::InvalidArguments {
                tool: self.descriptor.name.clone(),
                reason: format!("arguments must be a JSON object, got {}", other),
            }),
        }
    }
}

#[async_trait]
impl ToolTrait for McpTool {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn description(&self) -> &str {
        &self.descriptor.description
    }

    fn parameters(&self) -> Value {
        if self.descriptor.input_schema.is_object() {
            self.descriptor.input_schema.clone()
        } else {
            ops_assistant_mcp::empty_object_schema()
        }
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let arguments = self.arguments(args)?;
        let shown = Value::Object(arguments.clone()).to_string();
        debug!("◆ {} ARGS: {}", self.descriptor.name, shown);

        let result = self.client.call_tool(&self.descriptor.name, arguments).await?;
        Ok(render_result(result.as_ref()))
    }
}

/// Text the model sees for a tool result.
///
/// Strings pass through, MCP `content` blocks are joined by newlines and
/// anything else is compact JSON.
pub fn render_result(result: Option<&Value>) -> String {
    let Some(value) = result else {
        return "null".to_string();
    };

    if let Value::String(text) = value {
        return text.clone();
    }

    if let Some(blocks) = value.get("content").and_then(Value::as_array) {
        let texts: Vec<&str> = blocks
            .iter()
            .filter_map(|block| block.get("text").and_then(Value::as_str))
            .collect();
        if !texts.is_empty() {
            return texts.join("\n");
        }
    }

    value.to_string()
}

/// One adapter per descriptor; the client's cached list when none are given
pub fn build_mcp_tools(
    client: &Arc<dyn ToolClient>,
    descriptors: Option<&[ToolDescriptor]>,
) -> Vec<McpTool> {
    let descriptors = match descriptors {
        Some(list) => list.to_vec(),
        None => client.cached_tools(),
    };

    descriptors
        .into_iter()
        .map(|descriptor| McpTool::new(descriptor, Arc::clone(client)))
        .collect()
}

/// Discover the remote tools and register them, guarded by `retry` when set.
///
/// Returns how many tools were registered.
pub async fn register_mcp_tools(
    registry: &mut ToolRegistry,
    client: Arc<dyn ToolClient>,
    retry: Option<RetryPolicy>,
) -> ops_assistant_mcp::Result<usize> {
    let descriptors = client.list_tools().await?;
    let tools = build_mcp_tools(&client, Some(&descriptors));
    let count = tools.len();

    for tool in tools {
        match retry {
            Some(policy) => registry.register(RetryingTool::new(tool, policy)),
            None => registry.register(tool),
        }
    }

    info!(
        "◆ REGISTERED {} REMOTE TOOLS (RETRY {})",
        count,
        if retry.is_some() { "ON" } else { "OFF" }
    );
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_string_verbatim() {
        let value = json!("Job 42 finished: successful");
        assert_eq!(render_result(Some(&value)), "Job 42 finished: successful");
    }

    #[test]
    fn test_render_content_blocks() {
        let value = json!({
            "content": [
                {"type": "text", "text": "PLAY [all]"},
                {"type": "image", "data": "..."},
                {"type": "text", "text": "ok=3 changed=1"}
            ]
        });
        assert_eq!(render_result(Some(&value)), "PLAY [all]\nok=3 changed=1");
    }

    #[test]
    fn test_render_other_values_as_json() {
        let value = json!({"id": 7, "status": "running"});
        assert_eq!(render_result(Some(&value)), "{\"id\":7,\"status\":\"running\"}");

        let value = json!({"content": []});
        assert_eq!(render_result(Some(&value)), "{\"content\":[]}");

        assert_eq!(render_result(Some(&json!(3))), "3");
    }

    #[test]
    fn test_render_absent() {
        assert_eq!(render_result(None), "null");
    }
}
