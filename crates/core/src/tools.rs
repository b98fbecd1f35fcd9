// Tool invocation seam between the agent loop and an external tool server

use crate::error::AgentResult;
use serde::{Deserialize, Serialize};

/// A tool the model may call, as advertised by the tool server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Source of callable tools
#[async_trait::async_trait]
pub trait ToolInvoker: Send + Sync {
    /// List the tools currently advertised
    async fn list_tools(&self) -> AgentResult<Vec<ToolSpec>>;

    /// Call a tool by name with JSON arguments
    async fn call_tool(&self, name: &str, arguments: serde_json::Value)
        -> AgentResult<serde_json::Value>;
}

/// Invoker with no tools, for running without a tool server
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTools;

#[async_trait::async_trait]
impl ToolInvoker for NoTools {
    async fn list_tools(&self) -> AgentResult<Vec<ToolSpec>> {
        Ok(Vec::new())
    }

    async fn call_tool(
        &self,
        name: &str,
        _arguments: serde_json::Value,
    ) -> AgentResult<serde_json::Value> {
        Err(crate::error::AgentError::tool(format!("Unknown tool: {}", name)))
    }
}
