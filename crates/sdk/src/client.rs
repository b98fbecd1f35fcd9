//! Main client for the Bullpen SDK.

use crate::api::{AgentApi, ChatApi, HealthApi};
use crate::config::ClientConfig;
use crate::error::{BullpenError, BullpenResult};
use crate::transport::HttpTransport;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Main client for talking to a Bullpen agent server.
#[derive(Clone)]
pub struct BullpenClient {
    config: Arc<ClientConfig>,
    pub(crate) http: HttpTransport,
}

impl BullpenClient {
    /// Create a new client builder.
    pub fn builder() -> BullpenClientBuilder {
        BullpenClientBuilder::new()
    }

    fn from_config(config: ClientConfig) -> BullpenResult<Self> {
        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone())?;

        Ok(Self { config, http })
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// Get the agent description API.
    pub fn agent(&self) -> AgentApi<'_> {
        AgentApi::new(self)
    }

    /// Get the chat API.
    pub fn chat(&self) -> ChatApi<'_> {
        ChatApi::new(self)
    }

    /// Get the health API.
    pub fn health(&self) -> HealthApi<'_> {
        HealthApi::new(self)
    }
}

/// Builder for creating a BullpenClient.
pub struct BullpenClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl BullpenClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: None,
        }
    }

    /// Set the base URL of the Bullpen server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> BullpenResult<BullpenClient> {
        let base_url_str = self
            .base_url
            .ok_or_else(|| BullpenError::Config("base_url is required".to_string()))?;

        let mut config = ClientConfig::new(Url::parse(&base_url_str)?);
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }

        BullpenClient::from_config(config)
    }
}

impl Default for BullpenClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
