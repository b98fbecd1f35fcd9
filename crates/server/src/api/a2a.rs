// A2A JSON-RPC endpoint (message/send)

use crate::config::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use bullpen_mcp::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use serde_json::{json, Value};
use std::sync::Arc;

const DEFAULT_SESSION: &str = "default";

/// Params keys that name the conversation, checked in order
const SESSION_KEYS: [&str; 4] = ["session_id", "sessionId", "conversation_id", "conversationId"];

/// POST / - JSON-RPC 2.0 over HTTP; errors travel in the envelope with status 200
pub async fn rpc(
    State(state): State<Arc<AppState>>,
    body: Result<Json<JsonRpcRequest>, JsonRejection>,
) -> Json<JsonRpcResponse> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(e) => {
            tracing::debug!(error = %e.body_text(), "Unparsable A2A request");
            return Json(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error()));
        }
    };
    let id = request.id.clone().unwrap_or(Value::Null);

    let outcome = match request.method.as_str() {
        "message/send" => send_message(&state, request.params.unwrap_or(Value::Null)).await,
        other => Err(JsonRpcError::method_not_found(other)),
    };

    Json(match outcome {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(error) => JsonRpcResponse::error(id, error),
    })
}

async fn send_message(state: &AppState, params: Value) -> Result<Value, JsonRpcError> {
    let message = params.get("message").cloned().unwrap_or(Value::Null);
    let text = message_text(&message)
        .ok_or_else(|| JsonRpcError::invalid_params("No text content in message"))?;
    let session = session_id(&params, &message);

    let reply = state
        .agent
        .invoke(&text, Some(session.as_str()))
        .await
        .map_err(|e| {
            tracing::error!("A2A message failed: {}", e);
            JsonRpcError::internal_error(e.to_string())
        })?;

    tracing::info!(prompt = %reply.prompt, session = %session, "A2A message answered");

    Ok(json!({
        "kind": "message",
        "role": "agent",
        "messageId": uuid::Uuid::new_v4().to_string(),
        "parts": [{ "kind": "text", "text": reply.text }],
    }))
}

/// Joined text parts of an A2A message, or its plain `content` string
fn message_text(message: &Value) -> Option<String> {
    let parts: Vec<&str> = message
        .get("parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter(|p| {
                    let kind = p.get("kind").or_else(|| p.get("type"));
                    kind.and_then(Value::as_str) == Some("text")
                })
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .filter(|t| !t.trim().is_empty())
                .collect()
        })
        .unwrap_or_default();

    if !parts.is_empty() {
        return Some(parts.join("\n"));
    }

    message
        .get("content")
        .and_then(Value::as_str)
        .filter(|c| !c.trim().is_empty())
        .map(str::to_string)
}

fn session_id(params: &Value, message: &Value) -> String {
    SESSION_KEYS
        .iter()
        .filter_map(|k| params.get(*k))
        .chain(message.get("messageId"))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| DEFAULT_SESSION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_text_joins_text_parts() {
        let message = json!({
            "parts": [
                { "kind": "text", "text": "Why is" },
                { "kind": "file", "file": { "uri": "x" } },
                { "type": "text", "text": "he leaving?" }
            ]
        });
        assert_eq!(message_text(&message).as_deref(), Some("Why is\nhe leaving?"));

        assert_eq!(
            message_text(&json!({ "content": "plain" })).as_deref(),
            Some("plain")
        );
        assert_eq!(message_text(&json!({ "parts": [{ "kind": "data" }] })), None);
    }

    #[test]
    fn test_session_id_precedence() {
        let message = json!({ "messageId": "m-1" });
        assert_eq!(session_id(&json!({ "sessionId": "s-1" }), &message), "s-1");
        assert_eq!(session_id(&json!({ "conversationId": 7 }), &message), "7");
        assert_eq!(session_id(&json!({ "sessionId": "" }), &message), "m-1");
        assert_eq!(session_id(&json!({}), &json!({})), "default");
    }
}
