use anyhow::{Context, Result};
use bullpen_core::llm::{AnthropicClient, AnthropicConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use bullpen_core::memory::ConversationStore;
use bullpen_core::prompts::PromptSet;
use bullpen_core::router::{default_rules, PromptRouter, RoutingRule};
use bullpen_core::tools::ToolInvoker;
use bullpen_core::{AgentCard, AgentSettings, PromptKind, TransferAgent};
use bullpen_mcp::tools::{mlb_registry, StatsApi};
use bullpen_mcp::{resolve_mcp_url, McpServer, McpToolAdapter};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Settings read from `bullpen.toml`; every section is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub agent: AgentConfig,
    pub mcp: McpConfig,
    pub memory: MemoryConfig,
    pub stream: StreamConfig,
    pub card: CardConfig,
    pub routing: RoutingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_iterations: usize,
    pub tool_load_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.0,
            max_iterations: 25,
            tool_load_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct McpConfig {
    /// Overrides `MLB_MCP_SERVER_URL` and `VERCEL_URL`
    pub url: Option<String>,
    /// Mount the MLB tool server under `/mlb` in this process
    pub embedded: bool,
    pub timeout_secs: u64,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            url: None,
            embedded: false,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub enabled: bool,
    pub max_messages: usize,
    /// Sessions kept before the least recently used one is dropped
    pub max_sessions: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_messages: 20,
            max_sessions: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub chunk_delay_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { chunk_delay_ms: 100 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    pub url: String,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000/".to_string(),
        }
    }
}

/// Keyword overrides; a missing list keeps the built-in keywords
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub club_official: Option<Vec<String>>,
    pub player: Option<Vec<String>>,
    pub fan: Option<Vec<String>>,
}

impl RoutingConfig {
    pub fn router(&self) -> PromptRouter {
        let rules = default_rules()
            .into_iter()
            .map(|rule| {
                let custom = match rule.kind {
                    PromptKind::ClubOfficial => &self.club_official,
                    PromptKind::Player => &self.player,
                    PromptKind::Fan => &self.fan,
                    PromptKind::Default => &None,
                };
                match custom {
                    Some(keywords) => RoutingRule {
                        kind: rule.kind,
                        keywords: keywords.clone(),
                    },
                    None => rule,
                }
            })
            .collect();

        PromptRouter::new(rules)
    }
}

impl ServerConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            tracing::info!("Configuration file not found, using defaults");
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(config_path).context("Failed to read configuration file")?;
        toml::from_str(&content).context("Failed to parse configuration file")
    }
}

/// Settings taken from the process environment
#[derive(Debug, Clone)]
pub struct Environment {
    pub anthropic_api_key: String,
    pub anthropic_model: String,
    pub anthropic_base_url: String,
    pub mcp_server_url: Option<String>,
    pub vercel_url: Option<String>,
    pub langsmith: LangSmith,
}

/// LangSmith variables are recorded for the startup log only
#[derive(Debug, Clone, Default)]
pub struct LangSmith {
    pub tracing: bool,
    pub project: Option<String>,
    pub api_key_set: bool,
}

impl Environment {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let anthropic_api_key = var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY must be set (environment or .env)")?;

        let flag = |key: &str| {
            var(key)
                .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
                .unwrap_or(false)
        };

        Ok(Self {
            anthropic_api_key,
            anthropic_model: var("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            anthropic_base_url: var("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            mcp_server_url: var("MLB_MCP_SERVER_URL"),
            vercel_url: var("VERCEL_URL"),
            langsmith: LangSmith {
                tracing: flag("LANGSMITH_TRACING") || flag("LANGCHAIN_TRACING_V2"),
                project: var("LANGSMITH_PROJECT"),
                api_key_set: var("LANGSMITH_API_KEY").is_some(),
            },
        })
    }

    /// MCP endpoint, preferring the config file over the environment.
    ///
    /// With nothing configured, the local server on `listen_port` is used.
    pub fn mcp_url(&self, config: &McpConfig, listen_port: u16) -> String {
        resolve_mcp_url(
            config.url.as_deref().or(self.mcp_server_url.as_deref()),
            self.vercel_url.as_deref(),
            listen_port,
        )
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<TransferAgent>,
    pub card: Arc<AgentCard>,
    pub chunk_delay: Duration,
    pub embedded_mcp: Option<Arc<McpServer>>,
}

impl AppState {
    pub fn new(
        config: &ServerConfig,
        env: &Environment,
        prompts_dir: &Path,
        listen_port: u16,
    ) -> Result<Self> {
        let model = AnthropicClient::new(AnthropicConfig {
            api_key: env.anthropic_api_key.clone(),
            model: env.anthropic_model.clone(),
            base_url: env.anthropic_base_url.clone(),
            max_tokens: config.agent.max_tokens,
            temperature: config.agent.temperature,
            ..AnthropicConfig::new(env.anthropic_api_key.clone())
        })
        .context("Failed to create Anthropic client")?;

        let mcp_url = env.mcp_url(&config.mcp, listen_port);
        tracing::info!("MCP server URL: {}", mcp_url);
        let tools = McpToolAdapter::connect(&mcp_url, Duration::from_secs(config.mcp.timeout_secs))
            .context("Failed to create MCP client")?;

        let embedded_mcp = if config.mcp.embedded {
            let registry = mlb_registry(&StatsApi::new()?);
            tracing::info!("Embedding MCP server with {} tools under /mlb", registry.len());
            Some(Arc::new(McpServer::new(registry)))
        } else {
            None
        };

        Ok(Self::from_parts(
            config,
            Arc::new(model),
            Arc::new(tools),
            prompts_dir,
            embedded_mcp,
        ))
    }

    /// Assemble state around an arbitrary model and tool source
    pub fn from_parts(
        config: &ServerConfig,
        model: Arc<dyn bullpen_core::llm::ChatModel>,
        tools: Arc<dyn ToolInvoker>,
        prompts_dir: &Path,
        embedded_mcp: Option<Arc<McpServer>>,
    ) -> Self {
        let mut agent = TransferAgent::new(model, tools)
            .with_router(config.routing.router())
            .with_prompts(PromptSet::load(prompts_dir))
            .with_settings(AgentSettings {
                max_iterations: config.agent.max_iterations,
                tool_load_timeout: Duration::from_secs(config.agent.tool_load_timeout_secs),
            });

        if config.memory.enabled {
            tracing::info!(
                "Conversation memory enabled ({} messages per session, {} sessions)",
                config.memory.max_messages,
                config.memory.max_sessions
            );
            agent = agent.with_memory(
                ConversationStore::new(config.memory.max_messages)
                    .with_max_sessions(config.memory.max_sessions),
            );
        }

        Self {
            agent: Arc::new(agent),
            card: Arc::new(AgentCard::mlb_transfer(
                config.card.url.clone(),
                env!("CARGO_PKG_VERSION"),
            )),
            chunk_delay: Duration::from_millis(config.stream.chunk_delay_ms),
            embedded_mcp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bullpen_mcp::DEFAULT_LOCAL_PORT;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_api_key_fails() {
        let err = Environment::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));

        assert!(Environment::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "  ")])).is_err());
    }

    #[test]
    fn test_environment_defaults() {
        let env = Environment::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "sk-test")])).unwrap();
        assert_eq!(env.anthropic_model, DEFAULT_MODEL);
        assert_eq!(env.anthropic_base_url, DEFAULT_BASE_URL);
        assert!(!env.langsmith.tracing);
        assert_eq!(
            env.mcp_url(&McpConfig::default(), DEFAULT_LOCAL_PORT),
            "http://localhost:8000/mlb/mcp/"
        );
    }

    #[test]
    fn test_local_mcp_url_uses_listen_port() {
        let env = Environment::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "sk-test")])).unwrap();
        assert_eq!(
            env.mcp_url(&McpConfig::default(), 3000),
            "http://localhost:3000/mlb/mcp/"
        );
    }

    #[test]
    fn test_mcp_url_precedence() {
        let env = Environment::from_lookup(lookup(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("MLB_MCP_SERVER_URL", "http://mcp.internal:9000/mcp"),
            ("VERCEL_URL", "bullpen.vercel.app"),
            ("LANGCHAIN_TRACING_V2", "true"),
        ]))
        .unwrap();
        assert!(env.langsmith.tracing);
        assert_eq!(
            env.mcp_url(&McpConfig::default(), 3000),
            "http://mcp.internal:9000/mcp/"
        );

        let config = McpConfig {
            url: Some("http://override/mcp/".to_string()),
            ..McpConfig::default()
        };
        assert_eq!(env.mcp_url(&config, 3000), "http://override/mcp/");
    }

    #[test]
    fn test_parse_partial_config() {
        let config: ServerConfig = toml::from_str(
            r#"
            [memory]
            enabled = true

            [stream]
            chunk_delay_ms = 0

            [routing]
            fan = ["farewell"]
            "#,
        )
        .unwrap();

        assert!(config.memory.enabled);
        assert_eq!(config.memory.max_messages, 20);
        assert_eq!(config.memory.max_sessions, 1000);
        assert_eq!(config.stream.chunk_delay_ms, 0);
        assert_eq!(config.agent.max_iterations, 25);

        let router = config.routing.router();
        assert_eq!(router.route("A farewell to our ace"), PromptKind::Fan);
        assert_eq!(router.route("영입 계획"), PromptKind::ClubOfficial);
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::load(&dir.path().join("bullpen.toml")).unwrap();
        assert!(!config.mcp.embedded);
        assert_eq!(config.card.url, "http://localhost:8000/");
    }
}
