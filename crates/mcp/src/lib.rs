// Model Context Protocol plumbing for Bullpen
//
// Client side: the streamable HTTP client and the adapter that hands MCP
// tools to the agent loop. Server side: the MLB tool server with HTTP and
// stdio transports.

pub mod adapter;
pub mod client;
pub mod error;
pub mod http;
pub mod protocol;
pub mod server;
pub mod tools;

pub use adapter::McpToolAdapter;
pub use client::{local_mcp_url, resolve_mcp_url, McpClient, DEFAULT_LOCAL_PORT};
pub use error::{McpError, McpResult};
pub use server::McpServer;
