//! Remote text retrieval.
//!
//! Everything the pipeline downloads goes through the [`Fetcher`] trait, so
//! the catalog, coordinate files and image search can be driven by an
//! in-memory implementation in tests.

use std::fmt;
use std::time::Duration;

use reqwest::{Client, Url};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};

/// A source of remote text documents.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync + fmt::Debug {
    /// Retrieve the body of `url` as text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the resource is unreachable or the
    /// response is not a success.
    async fn fetch_text(&self, url: &Url) -> Result<String>;
}

/// HTTP implementation of [`Fetcher`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with the given user agent and optional timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Build a fetcher from the pipeline section of the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.pipeline.user_agent, config.request_timeout())
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String> {
        debug!(url = %without_query(url), "GET");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::transport(url.as_str(), e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::transport(url.as_str(), format!("HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| Error::transport(url.as_str(), e.without_url().to_string()))
    }
}

/// `url` with its query string and fragment removed, for logs and errors
/// that must not carry credentials.
#[must_use]
pub fn without_query(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_query(None);
    url.set_fragment(None);
    url
}
