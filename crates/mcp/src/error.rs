// Errors raised by the MCP client

use crate::protocol::JsonRpcError;
use thiserror::Error;

pub type McpResult<T> = Result<T, McpError>;

#[derive(Debug, Error)]
pub enum McpError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("MCP server returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server answered with a JSON-RPC error object
    #[error("JSON-RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    #[error("no response with id {0} in server reply")]
    MissingResponse(u64),

    #[error("tool {tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("invalid MCP server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
