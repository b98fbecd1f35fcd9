//! HTTP transport layer for the Bullpen SDK.

use crate::config::ClientConfig;
use crate::error::{BullpenError, BullpenResult};
use reqwest::{header, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::debug;

/// HTTP transport for making API requests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>) -> BullpenResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("bullpen-sdk/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Build a URL for the given path.
    fn build_url(&self, path: &str) -> BullpenResult<url::Url> {
        Ok(self.config.base_url.join(path)?)
    }

    /// Send a request, turning non-success statuses into API errors.
    async fn execute(&self, request: RequestBuilder) -> BullpenResult<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(BullpenError::from_response(status.as_u16(), &body))
    }

    /// Execute a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> BullpenResult<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, "GET request");

        let response = self.execute(self.client.get(url)).await?;
        Ok(response.json().await?)
    }

    /// Execute a POST request.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> BullpenResult<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, "POST request");

        let response = self.execute(self.client.post(url).json(body)).await?;
        Ok(response.json().await?)
    }

    /// Execute a POST request and hand back the raw response for streaming.
    pub async fn post_stream<B: Serialize>(&self, path: &str, body: &B) -> BullpenResult<Response> {
        let url = self.build_url(path)?;
        debug!(url = %url, "POST request (stream)");

        self.execute(
            self.client
                .post(url)
                .header(header::ACCEPT, "text/event-stream")
                .json(body),
        )
        .await
    }
}
