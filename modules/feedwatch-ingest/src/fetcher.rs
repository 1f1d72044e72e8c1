// Raw byte fetching behind one trait.
//
// HttpFetcher is the production implementation; MockFetcher (testing.rs)
// serves canned bodies so pipelines run without a network.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use feedwatch_common::{FeedError, Result};
use tracing::debug;

const USER_AGENT: &str = "feedwatch/0.1";

/// How much of an error response body is kept in a fetch error.
const ERROR_BODY_CHARS: usize = 200;

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a URL. Non-2xx responses and network failures are `FeedError::Fetch`.
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

fn network_error(url: &str, err: reqwest::Error) -> FeedError {
    FeedError::Fetch {
        url: url.to_string(),
        status: err.status().map(|s| s.as_u16()),
        message: err.to_string(),
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| network_error(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FeedError::Fetch {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    body.chars().take(ERROR_BODY_CHARS).collect::<String>()
                ),
            });
        }

        let bytes = resp.bytes().await.map_err(|e| network_error(url, e))?;
        debug!(url, bytes = bytes.len(), "fetch: ok");
        Ok(bytes)
    }
}
