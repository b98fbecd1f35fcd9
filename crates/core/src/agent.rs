// The MLB transfer agent: prompt routing plus a model/tool loop

use crate::error::{AgentError, AgentResult};
use crate::llm::{ChatModel, ChatRequest};
use crate::memory::ConversationStore;
use crate::prompts::PromptSet;
use crate::router::PromptRouter;
use crate::tools::{ToolInvoker, ToolSpec};
use crate::types::{AgentReply, ChatMessage, ContentBlock, Role, DEFAULT_SESSION};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Tunables for the agent loop
#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// Model turns allowed per request before giving up
    pub max_iterations: usize,
    /// Upper bound on the one-time tool listing
    pub tool_load_timeout: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            tool_load_timeout: Duration::from_secs(5),
        }
    }
}

/// Answers MLB transfer questions.
///
/// Each call to [`TransferAgent::invoke`] routes the message to a prompt flow,
/// then alternates model turns and tool calls until the model answers
/// without requesting a tool. Tools are listed once, on first use; if the
/// listing fails the agent keeps working without tools.
pub struct TransferAgent {
    model: Arc<dyn ChatModel>,
    invoker: Arc<dyn ToolInvoker>,
    router: PromptRouter,
    prompts: PromptSet,
    memory: Option<ConversationStore>,
    settings: AgentSettings,
    tools: OnceCell<Vec<ToolSpec>>,
}

impl TransferAgent {
    pub fn new(model: Arc<dyn ChatModel>, invoker: Arc<dyn ToolInvoker>) -> Self {
        Self {
            model,
            invoker,
            router: PromptRouter::default(),
            prompts: PromptSet::builtin(),
            memory: None,
            settings: AgentSettings::default(),
            tools: OnceCell::new(),
        }
    }

    pub fn with_router(mut self, router: PromptRouter) -> Self {
        self.router = router;
        self
    }

    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_memory(mut self, memory: ConversationStore) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn router(&self) -> &PromptRouter {
        &self.router
    }

    /// Tools available to the model, listed on first call
    pub async fn tools(&self) -> &[ToolSpec] {
        self.tools
            .get_or_init(|| async {
                tracing::info!("Loading tools from tool server");
                match tokio::time::timeout(self.settings.tool_load_timeout, self.invoker.list_tools())
                    .await
                {
                    Ok(Ok(tools)) => {
                        tracing::info!("Loaded {} tools", tools.len());
                        tools
                    }
                    Ok(Err(e)) => {
                        tracing::warn!("Tool listing failed, continuing without tools: {}", e);
                        Vec::new()
                    }
                    Err(_) => {
                        tracing::warn!(
                            "Tool listing timed out after {:?}, continuing without tools",
                            self.settings.tool_load_timeout
                        );
                        Vec::new()
                    }
                }
            })
            .await
    }

    /// Answer `message`, optionally within a remembered session
    pub async fn invoke(&self, message: &str, session_id: Option<&str>) -> AgentResult<AgentReply> {
        let session = session_id
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SESSION);
        let tools = self.tools().await.to_vec();
        let routed = self.router.compose(&self.prompts, message);

        tracing::info!(prompt = %routed.kind, session = %session, "Invoking agent");

        let mut messages = match &self.memory {
            Some(memory) => memory.history(session).await,
            None => Vec::new(),
        };
        messages.push(ChatMessage::user(routed.text));

        let mut tool_calls = 0;

        for iteration in 0..self.settings.max_iterations {
            tracing::debug!("Agent iteration {}", iteration + 1);

            let response = self
                .model
                .complete(ChatRequest {
                    system: None,
                    messages: messages.clone(),
                    tools: tools.clone(),
                })
                .await?;

            let requested: Vec<(String, String, serde_json::Value)> = response
                .message
                .tool_uses()
                .into_iter()
                .map(|(id, name, input)| (id.to_string(), name.to_string(), input.clone()))
                .collect();

            if requested.is_empty() {
                let text = response.message.text();
                if let Some(memory) = &self.memory {
                    memory
                        .append(
                            session,
                            vec![ChatMessage::user(message), ChatMessage::assistant(text.clone())],
                        )
                        .await;
                }
                tracing::info!(tool_calls, "Agent produced a reply");
                return Ok(AgentReply {
                    text,
                    prompt: routed.kind,
                    tool_calls,
                });
            }

            messages.push(response.message);

            let mut results = Vec::with_capacity(requested.len());
            for (id, name, input) in requested {
                tool_calls += 1;
                results.push(self.run_tool(id, &name, input).await);
            }
            messages.push(ChatMessage {
                role: Role::User,
                content: results,
            });
        }

        Err(AgentError::IterationLimit(self.settings.max_iterations))
    }

    /// Call one tool; failures become an error result for the model
    async fn run_tool(&self, id: String, name: &str, input: serde_json::Value) -> ContentBlock {
        tracing::info!(tool = %name, "Calling tool");

        match self.invoker.call_tool(name, input).await {
            Ok(value) => ContentBlock::ToolResult {
                tool_use_id: id,
                content: match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                },
                is_error: false,
            },
            Err(e) => {
                tracing::error!(tool = %name, "Tool call failed: {}", e);
                ContentBlock::ToolResult {
                    tool_use_id: id,
                    content: tool_error_payload(name, &e).to_string(),
                    is_error: true,
                }
            }
        }
    }
}

fn tool_error_payload(tool_name: &str, error: &AgentError) -> serde_json::Value {
    serde_json::json!({
        "error": error.to_string(),
        "type": "error",
        "message": "The tool failed while running.",
        "tool_name": tool_name,
    })
}
