//! Configuration types for the Bullpen SDK.

use std::time::Duration;
use url::Url;

/// Configuration for the Bullpen client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Bullpen server.
    pub base_url: Url,
    /// Request timeout. Agent replies can take a while when tools are called.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(120),
        }
    }
}
