//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester:
//! - Building the shared HTTP client (one connection pool per run)
//! - GET requests returning the page body
//! - Classifying non-success statuses as errors
//!
//! Fetches are never retried; callers decide how a failure degrades.

use crate::config::{HarvesterConfig, UserAgentConfig};
use crate::HarvestError;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use review_harvester::config::{HarvesterConfig, UserAgentConfig};
/// use review_harvester::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &HarvesterConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    harvester: &HarvesterConfig,
) -> Result<Client, reqwest::Error> {
    // Format: Name/Version
    let user_agent = format!("{}/{}", user_agent.name, user_agent.version);

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(harvester.request_timeout_secs))
        .connect_timeout(Duration::from_secs(harvester.connect_timeout_secs))
        .pool_max_idle_per_host(harvester.max_concurrent_detail_fetches)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page and returns its body
///
/// # Returns
///
/// * `Ok(String)` - The body of a 2xx response
/// * `Err(HarvestError::HttpStatus)` - The server answered with another status
/// * `Err(HarvestError::Http)` - Network failure, timeout or unreadable body
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, HarvestError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(HarvestError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|source| HarvestError::Http {
        url: url.to_string(),
        source,
    })
}
