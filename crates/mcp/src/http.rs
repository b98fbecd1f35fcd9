// Streamable HTTP transport for the MCP server

use crate::protocol::SESSION_HEADER;
use crate::server::{McpServer, SERVER_NAME};
use anyhow::Result;
use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Serve the MCP router on `addr` until the process stops
pub async fn serve(addr: &str, server: McpServer) -> Result<()> {
    let app = router(Arc::new(server))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("MCP server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Routes for the MCP endpoint and its companion info routes.
///
/// Paths are relative so the router can be nested under a prefix.
pub fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp))
        .route("/mcp/", post(handle_mcp))
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/tools", get(list_tools))
        .with_state(server)
}

async fn handle_mcp(
    State(server): State<Arc<McpServer>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let initializing = is_initialize(&body);

    let Some(reply) = server.handle_text(&body).await else {
        return StatusCode::ACCEPTED.into_response();
    };

    let mut response = Json(reply).into_response();

    let session = if initializing {
        Some(uuid::Uuid::new_v4().to_string())
    } else {
        headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    if let Some(value) = session.and_then(|s| HeaderValue::from_str(&s).ok()) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }

    response
}

fn is_initialize(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body)
        .map(|v| v.get("method").and_then(|m| m.as_str()) == Some("initialize"))
        .unwrap_or(false)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn info(State(server): State<Arc<McpServer>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "running",
        "protocol": "mcp",
        "server_name": SERVER_NAME,
        "description": "Model Context Protocol server for MLB statistics and baseball data",
        "mcp_endpoint": "/mcp",
        "tools_available": server.registry().len(),
        "version": server.info().version,
    }))
}

async fn list_tools(State(server): State<Arc<McpServer>>) -> impl IntoResponse {
    let tools: Vec<serde_json::Value> = server
        .registry()
        .list_schemas()
        .into_iter()
        .map(|schema| {
            serde_json::json!({
                "name": schema.name,
                "description": schema.description,
                "parameters": schema.input_schema,
            })
        })
        .collect();

    Json(serde_json::json!({ "tools": tools }))
}
