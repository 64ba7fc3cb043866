//! Single-shot retrieval of the live catalog document.
//!
//! One GET per call. No retries and no caching; the store above decides
//! what to do with a failure.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use crate::config::CatalogConfig;
use crate::error::FetchError;

/// Something that can produce the raw catalog document.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self) -> Result<Bytes, FetchError>;

    /// Short description for log lines.
    fn describe(&self) -> String;
}

/// Fetches the catalog script over HTTP.
pub struct HttpFetcher {
    client: Client,
    url: String,
}

impl HttpFetcher {
    pub fn new(config: &CatalogConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            url: config.source_url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DocumentSource for HttpFetcher {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Bytes, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            // Drain the error body so the connection goes back to the pool.
            let _ = response.bytes().await;
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Body {
            url: self.url.clone(),
            source,
        })?;

        debug!(bytes = body.len(), "Fetched catalog document");
        Ok(body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
