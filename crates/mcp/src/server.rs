// MCP server: JSON-RPC dispatch over the tool registry

use crate::protocol::*;
use crate::tools::ToolRegistry;
use anyhow::Result;
use futures::{SinkExt, StreamExt};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

pub const SERVER_NAME: &str = "MLB API MCP Server";

pub struct McpServer {
    registry: ToolRegistry,
    info: Implementation,
    instructions: Option<String>,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(
                "Tools for MLB standings, schedules, rosters, player stats and sabermetrics."
                    .to_string(),
            ),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn info(&self) -> &Implementation {
        &self.info
    }

    /// Handle one decoded JSON-RPC message or batch.
    ///
    /// Returns `None` when nothing should be written back (notifications only).
    pub async fn handle_value(&self, message: serde_json::Value) -> Option<serde_json::Value> {
        match message {
            serde_json::Value::Array(batch) if batch.is_empty() => Some(error_value(
                serde_json::Value::Null,
                JsonRpcError::invalid_request(),
            )),
            serde_json::Value::Array(batch) => {
                let mut responses = Vec::new();
                for item in batch {
                    if let Some(response) = self.handle_single(item).await {
                        responses.push(response);
                    }
                }
                (!responses.is_empty()).then_some(serde_json::Value::Array(responses))
            }
            single => self.handle_single(single).await,
        }
    }

    /// Handle raw text, answering malformed JSON with a parse error
    pub async fn handle_text(&self, text: &str) -> Option<serde_json::Value> {
        match serde_json::from_str(text) {
            Ok(value) => self.handle_value(value).await,
            Err(e) => {
                tracing::debug!(error = %e, "Unparseable MCP message");
                Some(error_value(serde_json::Value::Null, JsonRpcError::parse_error()))
            }
        }
    }

    async fn handle_single(&self, message: serde_json::Value) -> Option<serde_json::Value> {
        let request: JsonRpcRequest = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(_) => {
                return Some(error_value(
                    serde_json::Value::Null,
                    JsonRpcError::invalid_request(),
                ))
            }
        };

        let response = self.handle(request).await?;
        serde_json::to_value(response).ok()
    }

    /// Dispatch a request. Notifications never produce a response.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        tracing::debug!(method = %request.method, "MCP request");

        let Some(id) = request.id.clone() else {
            if !request.method.starts_with("notifications/") {
                tracing::debug!(method = %request.method, "Ignoring unknown notification");
            }
            return None;
        };

        let outcome = match request.method.as_str() {
            "initialize" => self.initialize(request.params),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => self.list_tools(),
            "tools/call" => self.call_tool(request.params).await,
            other => Err(JsonRpcError::method_not_found(other)),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    fn initialize(
        &self,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, JsonRpcError> {
        let params: InitializeParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| JsonRpcError::invalid_params(e.to_string()))?
            .ok_or_else(|| JsonRpcError::invalid_params("initialize requires params"))?;

        tracing::info!(
            client = %params.client_info.name,
            version = %params.client_info.version,
            "MCP client initialized"
        );

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: self.info.clone(),
            instructions: self.instructions.clone(),
        };

        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }

    fn list_tools(&self) -> Result<serde_json::Value, JsonRpcError> {
        let result = ListToolsResult {
            tools: self.registry.list_schemas(),
            next_cursor: None,
        };
        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }

    async fn call_tool(
        &self,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, JsonRpcError> {
        let params: CallToolParams = serde_json::from_value(params.unwrap_or_default())
            .map_err(|e| JsonRpcError::invalid_params(e.to_string()))?;

        let tool = self.registry.get(&params.name).ok_or_else(|| {
            JsonRpcError::invalid_params(format!("Unknown tool: {}", params.name))
        })?;

        let result = match tool.execute(params.arguments).await {
            Ok(result) => result,
            Err(e) => CallToolResult::error(format!("{:#}", e)),
        };

        if result.is_error() {
            tracing::warn!(tool = %params.name, "Tool call returned an error");
        }

        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }

    /// Serve newline-delimited JSON-RPC on stdin/stdout until stdin closes
    pub async fn serve_stdio(&self) -> Result<()> {
        let mut reader = FramedRead::new(tokio::io::stdin(), LinesCodec::new());
        let mut writer = FramedWrite::new(tokio::io::stdout(), LinesCodec::new());

        tracing::info!(tools = self.registry.len(), "MCP server listening on stdio");

        while let Some(line) = reader.next().await {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_text(&line).await {
                writer.send(response.to_string()).await?;
            }
        }

        tracing::info!("stdin closed, MCP server stopping");
        Ok(())
    }
}

fn error_value(id: serde_json::Value, error: JsonRpcError) -> serde_json::Value {
    serde_json::to_value(JsonRpcResponse::error(id, error)).unwrap_or_default()
}
