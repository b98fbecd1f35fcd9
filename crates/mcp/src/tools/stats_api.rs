// HTTP client for the public MLB stats API

use anyhow::{bail, Context, Result};
use std::time::Duration;

pub const STATS_API_URL: &str = "https://statsapi.mlb.com/api/v1";

#[derive(Clone)]
pub struct StatsApi {
    http: reqwest::Client,
    base_url: String,
}

impl StatsApi {
    pub fn new() -> Result<Self> {
        Self::with_base_url(STATS_API_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("bullpen-mcp/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base}/{path}` and decode the JSON body.
    ///
    /// Query pairs with a `None` value are left out.
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, Option<String>)],
    ) -> Result<serde_json::Value> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let query: Vec<(&str, &str)> = query
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (*k, v)))
            .collect();

        tracing::debug!(%url, ?query, "stats API request");

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", path))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Stats API error: {} for {}", status.as_u16(), path);
        }

        response
            .json()
            .await
            .with_context(|| format!("Invalid JSON from {}", path))
    }
}
