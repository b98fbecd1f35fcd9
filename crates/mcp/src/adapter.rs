// Exposes MCP server tools to the agent loop

use crate::client::McpClient;
use crate::error::{McpError, McpResult};
use crate::protocol::{CallToolResult, ToolContent};
use bullpen_core::tools::{ToolInvoker, ToolSpec};
use bullpen_core::{AgentError, AgentResult};
use std::time::Duration;
use tokio::sync::OnceCell;

/// [`ToolInvoker`] backed by a remote MCP server.
///
/// The initialize handshake runs on first use and is not repeated.
pub struct McpToolAdapter {
    client: McpClient,
    ready: OnceCell<()>,
}

impl McpToolAdapter {
    pub fn new(client: McpClient) -> Self {
        Self {
            client,
            ready: OnceCell::new(),
        }
    }

    pub fn connect(url: &str, timeout: Duration) -> McpResult<Self> {
        Ok(Self::new(McpClient::new(url, timeout)?))
    }

    pub fn client(&self) -> &McpClient {
        &self.client
    }

    async fn ensure_ready(&self) -> McpResult<()> {
        self.ready
            .get_or_try_init(|| async {
                self.client.initialize().await?;
                Ok::<(), McpError>(())
            })
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ToolInvoker for McpToolAdapter {
    async fn list_tools(&self) -> AgentResult<Vec<ToolSpec>> {
        self.ensure_ready().await.map_err(to_agent_error)?;
        let tools = self.client.list_tools().await.map_err(to_agent_error)?;

        Ok(tools
            .into_iter()
            .map(|t| ToolSpec {
                name: t.name,
                description: t.description,
                input_schema: t.input_schema,
            })
            .collect())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> AgentResult<serde_json::Value> {
        self.ensure_ready().await.map_err(to_agent_error)?;
        let result = self
            .client
            .call_tool(name, arguments)
            .await
            .map_err(to_agent_error)?;

        marshal_result(name, result).map_err(to_agent_error)
    }
}

fn to_agent_error(error: McpError) -> AgentError {
    AgentError::tool(error.to_string())
}

/// Convert a tool result into a single JSON value for the model.
///
/// Structured content wins; otherwise each text block is parsed as JSON
/// when possible and kept as a string when not.
pub fn marshal_result(tool: &str, result: CallToolResult) -> McpResult<serde_json::Value> {
    if result.is_error() {
        return Err(McpError::ToolFailed {
            tool: tool.to_string(),
            message: joined_text(&result.content),
        });
    }

    if let Some(structured) = result.structured_content {
        return Ok(structured);
    }

    let mut values: Vec<serde_json::Value> = result
        .content
        .into_iter()
        .filter_map(|block| match block {
            ToolContent::Text { text } => Some(
                serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)),
            ),
            ToolContent::Unsupported => None,
            other => serde_json::to_value(other).ok(),
        })
        .collect();

    Ok(match values.len() {
        0 => serde_json::json!({ "result": null, "message": "No data returned." }),
        1 => values.remove(0),
        _ => serde_json::Value::Array(values),
    })
}

fn joined_text(content: &[ToolContent]) -> String {
    content
        .iter()
        .filter_map(|c| match c {
            ToolContent::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
