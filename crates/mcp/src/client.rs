//! Streamable-HTTP MCP client.
//!
//! Every JSON-RPC message is POSTed to the server's MCP endpoint. The server
//! may answer with a plain JSON body or with a `text/event-stream` body whose
//! `data:` events carry the response; both are accepted. A session id
//! handed out on `initialize` is echoed on every later request.

use crate::error::{McpError, McpResult};
use crate::protocol::{
    CallToolParams, CallToolResult, Implementation, InitializeParams, InitializeResult,
    JsonRpcRequest, JsonRpcResponse, ListToolsResult, ToolSchema, PROTOCOL_VERSION,
    SESSION_HEADER,
};
use bullpen_core::sse;
use reqwest::{header, Client};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

/// Port of the local fallback when none is configured
pub const DEFAULT_LOCAL_PORT: u16 = 8000;

/// Local fallback when neither `MLB_MCP_SERVER_URL` nor `VERCEL_URL` is set
pub fn local_mcp_url(port: u16) -> String {
    format!("http://localhost:{}/mlb/mcp", port)
}

/// Resolve the MCP endpoint from an explicit URL, a Vercel host, or the
/// local server listening on `local_port`.
///
/// The result always ends with `/`.
pub fn resolve_mcp_url(
    explicit: Option<&str>,
    vercel_host: Option<&str>,
    local_port: u16,
) -> String {
    let mut url = match (explicit, vercel_host) {
        (Some(url), _) if !url.is_empty() => url.to_string(),
        (_, Some(host)) if !host.is_empty() => {
            let base = if host.starts_with("http://") || host.starts_with("https://") {
                host.trim_end_matches('/').to_string()
            } else {
                format!("https://{}", host.trim_end_matches('/'))
            };
            format!("{}/mlb/mcp", base)
        }
        _ => local_mcp_url(local_port),
    };

    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

pub struct McpClient {
    http: Client,
    url: Url,
    session_id: RwLock<Option<String>>,
    next_id: AtomicU64,
}

impl McpClient {
    pub fn new(url: &str, timeout: Duration) -> McpResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bullpen-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            url: Url::parse(url)?,
            session_id: RwLock::new(None),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn session_id(&self) -> Option<String> {
        self.session_id.read().await.clone()
    }

    /// Run the initialize handshake
    pub async fn initialize(&self) -> McpResult<InitializeResult> {
        let params = InitializeParams {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: serde_json::json!({}),
            client_info: Implementation {
                name: "bullpen".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        let result = self
            .request("initialize", Some(serde_json::to_value(params)?))
            .await?;
        let result: InitializeResult = serde_json::from_value(result)?;

        tracing::info!(
            server = %result.server_info.name,
            version = %result.server_info.version,
            protocol = %result.protocol_version,
            "Connected to MCP server"
        );

        self.notify("notifications/initialized", None).await?;
        Ok(result)
    }

    /// List every tool, following pagination cursors.
    ///
    /// Stops when a cursor comes back a second time.
    pub async fn list_tools(&self) -> McpResult<Vec<ToolSchema>> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen = HashSet::new();

        loop {
            let params = cursor
                .as_ref()
                .map(|c| serde_json::json!({ "cursor": c }));
            let page: ListToolsResult =
                serde_json::from_value(self.request("tools/list", params).await?)?;
            tools.extend(page.tools);

            match page.next_cursor {
                Some(next) if !next.is_empty() => {
                    if !seen.insert(next.clone()) {
                        tracing::warn!(cursor = %next, "MCP server repeated a tools/list cursor");
                        break;
                    }
                    cursor = Some(next);
                }
                _ => break,
            }
        }

        Ok(tools)
    }

    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> McpResult<CallToolResult> {
        let params = CallToolParams {
            name: name.to_string(),
            arguments,
        };
        let result = self
            .request("tools/call", Some(serde_json::to_value(params)?))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> McpResult<serde_json::Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest::new(id, method, params);

        tracing::debug!(method = %method, id, "MCP request");

        let response = self.post(&request).await?;

        if let Some(session) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            *self.session_id.write().await = Some(session.to_string());
        }

        let is_event_stream = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("text/event-stream"))
            .unwrap_or(false);
        let body = response.text().await?;

        let reply = if is_event_stream {
            find_in_event_stream(&body, id)?
        } else {
            serde_json::from_str::<JsonRpcResponse>(&body)?
        };

        if let Some(error) = reply.error {
            return Err(McpError::Rpc(error));
        }
        Ok(reply.result.unwrap_or(serde_json::Value::Null))
    }

    async fn notify(&self, method: &str, params: Option<serde_json::Value>) -> McpResult<()> {
        let note = JsonRpcRequest::notification(method, params);
        self.post(&note).await?;
        Ok(())
    }

    async fn post(&self, message: &JsonRpcRequest) -> McpResult<reqwest::Response> {
        let mut builder = self
            .http
            .post(self.url.clone())
            .header(header::ACCEPT, "application/json, text/event-stream")
            .json(message);

        if let Some(session) = self.session_id.read().await.as_ref() {
            builder = builder.header(SESSION_HEADER, session);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(McpError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Pick the response with `id` out of an SSE body
fn find_in_event_stream(body: &str, id: u64) -> McpResult<JsonRpcResponse> {
    let wanted = serde_json::json!(id);

    sse::decode_events(body)
        .iter()
        .filter_map(|data| serde_json::from_str::<JsonRpcResponse>(data).ok())
        .find(|response| response.id == wanted)
        .ok_or(McpError::MissingResponse(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_resolve_explicit_url_wins() {
        assert_eq!(
            resolve_mcp_url(Some("https://mcp.example.com/mcp"), Some("app.vercel.app"), 8000),
            "https://mcp.example.com/mcp/"
        );
    }

    #[test]
    fn test_resolve_vercel_host() {
        assert_eq!(
            resolve_mcp_url(None, Some("a2a-mlb-agent.vercel.app"), 8000),
            "https://a2a-mlb-agent.vercel.app/mlb/mcp/"
        );
        assert_eq!(
            resolve_mcp_url(None, Some("http://preview.local"), 8000),
            "http://preview.local/mlb/mcp/"
        );
    }

    #[test]
    fn test_resolve_local_default() {
        assert_eq!(
            resolve_mcp_url(None, None, DEFAULT_LOCAL_PORT),
            "http://localhost:8000/mlb/mcp/"
        );
        assert_eq!(
            resolve_mcp_url(Some(""), Some(""), DEFAULT_LOCAL_PORT),
            "http://localhost:8000/mlb/mcp/"
        );
    }

    #[test]
    fn test_resolve_local_follows_port() {
        assert_eq!(resolve_mcp_url(None, None, 9090), "http://localhost:9090/mlb/mcp/");
    }

    #[test]
    fn test_event_stream_skips_other_ids() {
        let body = "event: message\ndata: {\"jsonrpc\":\"2.0\",\"id\":7,\"result\":{}}\n\n\
                    event: message\ndata: {\"jsonrpc\":\"2.0\",\"id\":8,\"result\":{\"ok\":true}}\n\n";
        let response = find_in_event_stream(body, 8).unwrap();
        assert_eq!(response.result.unwrap()["ok"], true);
        assert!(matches!(
            find_in_event_stream(body, 9),
            Err(McpError::MissingResponse(9))
        ));
    }

    fn init_body(id: u64) -> serde_json::Value {
        serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": {
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {"tools": {"listChanged": false}},
                "serverInfo": {"name": "MLB API MCP Server", "version": "1.0.0"}
            }
        })
    }

    #[tokio::test]
    async fn test_initialize_captures_session_and_lists_tools() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .and(body_partial_json(serde_json::json!({"method": "initialize"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(SESSION_HEADER, "session-abc")
                    .set_body_json(init_body(1)),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .and(body_partial_json(
                serde_json::json!({"method": "notifications/initialized"}),
            ))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .and(header(SESSION_HEADER, "session-abc"))
            .and(body_partial_json(serde_json::json!({"method": "tools/list"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 2,
                "result": {"tools": [{
                    "name": "get_mlb_teams",
                    "description": "Get all teams",
                    "inputSchema": {"type": "object"}
                }]}
            })))
            .mount(&server)
            .await;

        let client = McpClient::new(&format!("{}/mcp/", server.uri()), Duration::from_secs(5))
            .unwrap();
        let init = client.initialize().await.unwrap();
        assert_eq!(init.server_info.name, "MLB API MCP Server");
        assert_eq!(client.session_id().await.as_deref(), Some("session-abc"));

        let tools = client.list_tools().await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "get_mlb_teams");
    }

    #[tokio::test]
    async fn test_call_tool_over_event_stream() {
        let server = MockServer::start().await;

        let sse = "event: message\ndata: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"content\":[{\"type\":\"text\",\"text\":\"2024-07-01\"}]}}\n\n";
        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"),
            )
            .mount(&server)
            .await;

        let client = McpClient::new(&format!("{}/mcp/", server.uri()), Duration::from_secs(5))
            .unwrap();
        let result = client
            .call_tool("get_current_date", serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(result.content[0], crate::protocol::ToolContent::text("2024-07-01"));
    }

    #[tokio::test]
    async fn test_rpc_error_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": -32601, "message": "Method not found: tools/call"}
            })))
            .mount(&server)
            .await;

        let client = McpClient::new(&format!("{}/mcp/", server.uri()), Duration::from_secs(5))
            .unwrap();
        let err = client
            .call_tool("anything", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::Rpc(ref e) if e.code == -32601));
    }

    #[tokio::test]
    async fn test_list_tools_stops_on_repeated_cursor() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .and(body_partial_json(serde_json::json!({"method": "tools/list"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "tools": [{
                        "name": "get_mlb_teams",
                        "description": "Get all teams",
                        "inputSchema": {"type": "object"}
                    }],
                    "nextCursor": "page-2"
                }
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = McpClient::new(&format!("{}/mcp/", server.uri()), Duration::from_secs(5))
            .unwrap();
        let tools = client.list_tools().await.unwrap();
        // first page, then the page behind "page-2", which points at itself
        assert_eq!(tools.len(), 2);
    }

    #[tokio::test]
    async fn test_http_status_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mcp/"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let client = McpClient::new(&format!("{}/mcp/", server.uri()), Duration::from_secs(5))
            .unwrap();
        let err = client.list_tools().await.unwrap_err();
        assert!(matches!(err, McpError::Status { status: 503, .. }));
    }
}
