use super::{ApiError, ApiResult};
use crate::config::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use bullpen_core::{AgentCard, AgentInfo};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;

/// Tool names shown by `/api/mcp/status`
const STATUS_TOOL_PREVIEW: usize = 5;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub prompt: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct SkillSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub examples: Vec<String>,
}

/// GET / - short agent description
pub async fn agent_info(State(state): State<Arc<AppState>>) -> Json<AgentInfo> {
    Json(state.card.summary())
}

/// GET /.well-known/agent.json
pub async fn agent_card(State(state): State<Arc<AppState>>) -> Json<AgentCard> {
    Json(state.card.as_ref().clone())
}

/// GET /api/agent/skills
pub async fn agent_skills(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let skills: Vec<SkillSummary> = state
        .card
        .skills
        .iter()
        .map(|s| SkillSummary {
            id: s.id.clone(),
            name: s.name.clone(),
            description: s.description.clone(),
            tags: s.tags.clone(),
            examples: s.examples.clone(),
        })
        .collect();

    Json(serde_json::json!({ "skills": skills }))
}

/// Pull a non-empty message out of the request body
fn require_message(
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<(String, Option<String>)> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    match request.message {
        Some(message) if !message.trim().is_empty() => Ok((message, request.session_id)),
        _ => Err(ApiError::bad_request("message is required")),
    }
}

/// POST /api/chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<ChatResponse>> {
    let (message, session_id) = require_message(body)?;

    let reply = state.agent.invoke(&message, session_id.as_deref()).await?;

    tracing::info!(
        prompt = %reply.prompt,
        tool_calls = reply.tool_calls,
        "Chat answered"
    );

    Ok(Json(ChatResponse {
        response: reply.text,
        prompt: reply.prompt.to_string(),
        status: "success".to_string(),
    }))
}

/// POST /api/chat/stream - the finished reply replayed word by word over SSE
pub async fn chat_stream(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let (message, session_id) = require_message(body)?;
    let delay = state.chunk_delay;

    let stream = async_stream::stream! {
        match state.agent.invoke(&message, session_id.as_deref()).await {
            Ok(reply) => {
                for word in reply.text.split_whitespace() {
                    let data = serde_json::json!({ "chunk": word, "status": "streaming" });
                    yield Ok(Event::default().data(data.to_string()));
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                yield Ok(Event::default().data(serde_json::json!({ "status": "complete" }).to_string()));
            }
            Err(e) => {
                tracing::error!("Streaming chat failed: {}", e);
                let data = serde_json::json!({ "error": e.to_string(), "status": "error" });
                yield Ok(Event::default().data(data.to_string()));
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// GET /api/mcp/status
pub async fn mcp_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let tools = state.agent.tools().await;

    if tools.is_empty() {
        return Json(serde_json::json!({
            "status": "no_tools",
            "message": "MCP tools are not loaded",
        }));
    }

    let preview: Vec<&str> = tools
        .iter()
        .take(STATUS_TOOL_PREVIEW)
        .map(|t| t.name.as_str())
        .collect();

    Json(serde_json::json!({
        "status": "connected",
        "tool_count": tools.len(),
        "tools": preview,
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::create_router;
    use crate::config::{AppState, ServerConfig};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use bullpen_core::llm::{ChatModel, ChatRequest, ChatResponse};
    use bullpen_core::tools::{NoTools, ToolInvoker, ToolSpec};
    use bullpen_core::{AgentError, AgentResult, ChatMessage};
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    /// Replies with a fixed answer and records the prompt it was given
    struct EchoModel {
        answer: Result<String, String>,
        seen: Mutex<Vec<String>>,
    }

    impl EchoModel {
        fn answering(text: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: Err(message.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl ChatModel for EchoModel {
        async fn complete(&self, request: ChatRequest) -> AgentResult<ChatResponse> {
            if let Some(last) = request.messages.last() {
                self.seen.lock().unwrap().push(last.text());
            }
            match &self.answer {
                Ok(text) => Ok(ChatResponse {
                    message: ChatMessage::assistant(text.clone()),
                    stop_reason: Some("end_turn".to_string()),
                }),
                Err(message) => Err(AgentError::Provider {
                    status: 529,
                    message: message.clone(),
                }),
            }
        }
    }

    struct ListedTools(usize);

    #[async_trait::async_trait]
    impl ToolInvoker for ListedTools {
        async fn list_tools(&self) -> AgentResult<Vec<ToolSpec>> {
            Ok((0..self.0)
                .map(|i| ToolSpec {
                    name: format!("tool_{}", i),
                    description: String::new(),
                    input_schema: serde_json::json!({"type": "object"}),
                })
                .collect())
        }

        async fn call_tool(
            &self,
            name: &str,
            _arguments: serde_json::Value,
        ) -> AgentResult<serde_json::Value> {
            Err(AgentError::tool(format!("{} is not callable here", name)))
        }
    }

    fn app_with(model: Arc<EchoModel>, tools: Arc<dyn ToolInvoker>) -> Router {
        let mut config = ServerConfig::default();
        config.stream.chunk_delay_ms = 0;
        let prompts = tempfile::tempdir().unwrap();
        create_router(AppState::from_parts(&config, model, tools, prompts.path(), None))
    }

    fn app(model: Arc<EchoModel>) -> Router {
        app_with(model, Arc::new(NoTools))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_body(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn read_json(response: axum::response::Response) -> serde_json::Value {
        serde_json::from_str(&read_body(response).await).unwrap()
    }

    fn sse_events(body: &str) -> Vec<serde_json::Value> {
        body.lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(|data| serde_json::from_str(data.trim()).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_health_needs_nothing_external() {
        let response = app(EchoModel::failing("down"))
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_agent_card_is_static() {
        let router = app(EchoModel::answering("ok"));

        let first = read_json(
            router
                .clone()
                .oneshot(Request::get("/.well-known/agent.json").body(Body::empty()).unwrap())
                .await
                .unwrap(),
        )
        .await;
        let second = read_json(
            router
                .oneshot(Request::get("/api/agent/card").body(Body::from("ignored")).unwrap())
                .await
                .unwrap(),
        )
        .await;

        assert_eq!(first, second);
        assert_eq!(first["name"], "MLB Transfer Agent");
        assert_eq!(first["skills"].as_array().unwrap().len(), 4);
        assert_eq!(first["capabilities"]["streaming"], true);
    }

    #[tokio::test]
    async fn test_info_and_skills() {
        let router = app(EchoModel::answering("ok"));

        let info = read_json(
            router
                .clone()
                .oneshot(Request::get("/").body(Body::empty()).unwrap())
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(info["status"], "running");

        let skills = read_json(
            router
                .oneshot(Request::get("/api/agent/skills").body(Body::empty()).unwrap())
                .await
                .unwrap(),
        )
        .await;
        let first = &skills["skills"][0];
        assert_eq!(first["id"], "mlb_transfer_analysis");
        assert!(first.get("inputModes").is_none());
    }

    #[tokio::test]
    async fn test_chat_routes_and_answers() {
        let model = EchoModel::answering("Trade for a lefty reliever.");
        let response = app(model.clone())
            .oneshot(post_json(
                "/api/chat",
                serde_json::json!({"message": "우리 팀 투수진 보강이 필요해"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["prompt"], "club_official");
        assert_eq!(body["response"], "Trade for a lefty reliever.");

        let seen = model.seen.lock().unwrap();
        assert!(seen[0].contains("우리 팀 투수진 보강이 필요해"));
    }

    #[tokio::test]
    async fn test_chat_requires_message() {
        let router = app(EchoModel::answering("unused"));

        for body in [serde_json::json!({}), serde_json::json!({"message": "   "})] {
            let response = router
                .clone()
                .oneshot(post_json("/api/chat", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let json = read_json(response).await;
            assert_eq!(json["status"], "error");
            assert_eq!(json["error"], "message is required");
        }

        let malformed = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_agent_failure_is_500() {
        let response = app(EchoModel::failing("overloaded"))
            .oneshot(post_json("/api/chat", serde_json::json!({"message": "hello"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = read_json(response).await;
        assert_eq!(body["status"], "error");
        assert!(body["error"].as_str().unwrap().contains("overloaded"));
    }

    #[tokio::test]
    async fn test_stream_emits_words_then_complete() {
        let response = app(EchoModel::answering("Judge stays  in\nNew York"))
            .oneshot(post_json(
                "/api/chat/stream",
                serde_json::json!({"message": "Why is he leaving?"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/event-stream");

        let events = sse_events(&read_body(response).await);
        let chunks: Vec<&str> = events
            .iter()
            .filter(|e| e["status"] == "streaming")
            .map(|e| e["chunk"].as_str().unwrap())
            .collect();
        assert_eq!(chunks, vec!["Judge", "stays", "in", "New", "York"]);
        assert_eq!(events.last().unwrap()["status"], "complete");
    }

    #[tokio::test]
    async fn test_stream_failure_is_single_error_event() {
        let response = app(EchoModel::failing("overloaded"))
            .oneshot(post_json("/api/chat/stream", serde_json::json!({"message": "hi"})))
            .await
            .unwrap();

        let events = sse_events(&read_body(response).await);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["status"], "error");
    }

    #[tokio::test]
    async fn test_a2a_message_send() {
        let model = EchoModel::answering("He wanted a longer contract.");
        let response = app(model.clone())
            .oneshot(post_json(
                "/",
                serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": "req-1",
                    "method": "message/send",
                    "params": {
                        "message": {
                            "role": "user",
                            "messageId": "m-1",
                            "parts": [{ "kind": "text", "text": "Why is our ace leaving?" }]
                        }
                    }
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["id"], "req-1");
        assert!(body.get("error").is_none());
        assert_eq!(body["result"]["kind"], "message");
        assert_eq!(body["result"]["role"], "agent");
        assert_eq!(
            body["result"]["parts"][0]["text"],
            "He wanted a longer contract."
        );

        let seen = model.seen.lock().unwrap();
        assert!(seen[0].contains("User question: Why is our ace leaving?"));
    }

    #[tokio::test]
    async fn test_a2a_message_without_text_is_error() {
        let model = EchoModel::answering("unused");
        let response = app(model.clone())
            .oneshot(post_json(
                "/",
                serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": 2,
                    "method": "message/send",
                    "params": { "message": { "parts": [{ "kind": "file", "file": {} }] } }
                }),
            ))
            .await
            .unwrap();

        let body = read_json(response).await;
        assert_eq!(body["id"], 2);
        assert_eq!(body["error"]["code"], -32602);
        assert!(body.get("result").is_none());
        assert!(model.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_a2a_unknown_method() {
        let router = app(EchoModel::answering("unused"));

        let body = read_json(
            router
                .clone()
                .oneshot(post_json(
                    "/",
                    serde_json::json!({"jsonrpc": "2.0", "id": 3, "method": "tasks/cancel"}),
                ))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(body["error"]["code"], -32601);
        assert_eq!(body["id"], 3);

        let malformed = read_json(
            router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/")
                        .header("content-type", "application/json")
                        .body(Body::from("{not json"))
                        .unwrap(),
                )
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(malformed["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn test_a2a_agent_failure_is_internal_error() {
        let body = read_json(
            app(EchoModel::failing("overloaded"))
                .oneshot(post_json(
                    "/",
                    serde_json::json!({
                        "jsonrpc": "2.0",
                        "id": 4,
                        "method": "message/send",
                        "params": { "message": { "parts": [{ "kind": "text", "text": "hi" }] } }
                    }),
                ))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(body["error"]["code"], -32603);
        assert!(body["error"]["message"].as_str().unwrap().contains("overloaded"));
    }

    #[tokio::test]
    async fn test_mcp_status() {
        let none = read_json(
            app(EchoModel::answering("ok"))
                .oneshot(Request::get("/api/mcp/status").body(Body::empty()).unwrap())
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(none["status"], "no_tools");

        let some = read_json(
            app_with(EchoModel::answering("ok"), Arc::new(ListedTools(7)))
                .oneshot(Request::get("/api/mcp/status").body(Body::empty()).unwrap())
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(some["status"], "connected");
        assert_eq!(some["tool_count"], 7);
        assert_eq!(some["tools"].as_array().unwrap().len(), 5);
    }
}
