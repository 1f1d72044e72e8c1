// Test mocks for the ingest pipelines.
//
// MockFetcher (Fetcher): HashMap-based URL→body. Pair it with MemoryStore
// (store.rs) to run a whole ingest without network or disk.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use feedwatch_common::{FeedError, Result};

use crate::fetcher::Fetcher;

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Canned responses by exact URL. Unregistered URLs fail like a 404.
/// Builder pattern: `.on()`, `.failing()`.
#[derive(Default)]
pub struct MockFetcher {
    bodies: HashMap<String, Bytes>,
    failures: HashMap<String, u16>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, url: &str, body: impl Into<Bytes>) -> Self {
        self.bodies.insert(url.to_string(), body.into());
        self
    }

    /// Respond to `url` with a non-2xx status.
    pub fn failing(mut self, url: &str, status: u16) -> Self {
        self.failures.insert(url.to_string(), status);
        self
    }

    /// Every URL fetched so far, in call order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        self.requests.lock().unwrap().push(url.to_string());

        if let Some(&status) = self.failures.get(url) {
            return Err(FeedError::Fetch {
                url: url.to_string(),
                status: Some(status),
                message: format!("HTTP {status}: mock failure"),
            });
        }
        self.bodies.get(url).cloned().ok_or_else(|| FeedError::Fetch {
            url: url.to_string(),
            status: Some(404),
            message: "HTTP 404: no mock registered".to_string(),
        })
    }
}
