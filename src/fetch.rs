/// Fetch source collaborator
///
/// A `FetchSource` performs one GET per cycle and hands back the raw body.
/// The feed owns the timeout, so implementations only report what the
/// transport itself saw.

use crate::config::ConfigError;
use crate::error::{FeedError, FeedResult};
use async_trait::async_trait;

#[async_trait]
pub trait FetchSource: Send + Sync {
    /// Fetch the body at `url`; non-2xx responses are errors
    async fn fetch(&self, url: &str) -> FeedResult<Vec<u8>>;
}

/// `reqwest`-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(HttpFetcher { client })
    }

    /// Reuse an externally managed client (connection pool, proxy settings)
    pub fn with_client(client: reqwest::Client) -> Self {
        HttpFetcher { client }
    }
}

#[async_trait]
impl FetchSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> FeedResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;
        Ok(body.to_vec())
    }
}
