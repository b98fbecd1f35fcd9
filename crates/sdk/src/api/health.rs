//! Health API endpoints.

use crate::client::BullpenClient;
use crate::error::BullpenResult;
use serde::{Deserialize, Serialize};

/// Health API for checking server and tool status.
pub struct HealthApi<'a> {
    client: &'a BullpenClient,
}

impl<'a> HealthApi<'a> {
    pub(crate) fn new(client: &'a BullpenClient) -> Self {
        Self { client }
    }

    /// Check basic health status.
    pub async fn check(&self) -> BullpenResult<HealthCheck> {
        self.client.http.get("/api/health").await
    }

    /// Whether the agent has MCP tools loaded.
    pub async fn mcp_status(&self) -> BullpenResult<McpStatus> {
        self.client.http.get("/api/mcp/status").await
    }
}

/// Basic health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Tool loading status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpStatus {
    pub status: String,
    #[serde(default)]
    pub tool_count: Option<usize>,
    /// First few tool names only
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl McpStatus {
    pub fn is_connected(&self) -> bool {
        self.status == "connected"
    }
}
