// Error type shared by the agent, the model client and tool invokers

use thiserror::Error;

pub type AgentResult<T> = Result<T, AgentError>;

#[derive(Debug, Error)]
pub enum AgentError {
    /// Transport-level failure talking to the model provider
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status
    #[error("model provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A tool could not be listed or invoked
    #[error("tool error: {0}")]
    Tool(String),

    #[error("agent stopped after {0} iterations without a final answer")]
    IterationLimit(usize),

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("configuration error: {0}")]
    Config(String),
}

impl AgentError {
    pub fn tool(message: impl Into<String>) -> Self {
        Self::Tool(message.into())
    }
}
