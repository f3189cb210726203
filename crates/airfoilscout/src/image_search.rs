//! Image lookup for the winning airfoil.
//!
//! Uses a Custom Search style JSON API: the response carries an `items`
//! array and only the first item's `link` is used. Lookup is best-effort;
//! every failure degrades to "no image".

use std::sync::Arc;

use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ImageSearchConfig;
use crate::error::{Error, Result};
use crate::fetch::{without_query, Fetcher};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: Option<String>,
}

/// Client for the image search API.
#[derive(Debug, Clone)]
pub struct ImageSearch {
    fetcher: Arc<dyn Fetcher>,
    endpoint: Url,
    api_key: String,
    engine_id: String,
}

impl ImageSearch {
    /// Build a client from configuration.
    ///
    /// Returns `Ok(None)` when image search is disabled or credentials are
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the endpoint is not a valid URL.
    pub fn from_config(config: &ImageSearchConfig, fetcher: Arc<dyn Fetcher>) -> Result<Option<Self>> {
        let (true, Some(api_key), Some(engine_id)) =
            (config.enabled, config.api_key.as_ref(), config.engine_id.as_ref())
        else {
            debug!("image search not configured");
            return Ok(None);
        };
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            Error::config(format!(
                "invalid image search endpoint {}: {e}",
                config.endpoint
            ))
        })?;
        Ok(Some(Self {
            fetcher,
            endpoint,
            api_key: api_key.clone(),
            engine_id: engine_id.clone(),
        }))
    }

    /// The request URL for a query.
    #[must_use]
    pub fn request_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("num", "1")
            .append_pair("start", "1")
            .append_pair("imgSize", "large")
            .append_pair("searchType", "image")
            .append_pair("key", &self.api_key)
            .append_pair("cx", &self.engine_id);
        url
    }

    /// Look up the first image link for `query`.
    ///
    /// Errors name the endpoint only; the request URL carries the API key.
    ///
    /// # Errors
    ///
    /// Returns a transport or JSON error if the request or decoding fails.
    pub async fn first_image(&self, query: &str) -> Result<Option<String>> {
        let body = self
            .fetcher
            .fetch_text(&self.request_url(query))
            .await
            .map_err(|e| match e {
                Error::Transport { message, .. } => {
                    Error::transport(without_query(&self.endpoint).as_str(), message)
                }
                other => other,
            })?;
        let response: SearchResponse = serde_json::from_str(&body)?;
        Ok(response.items.into_iter().next().and_then(|item| item.link))
    }

    /// Like [`first_image`](Self::first_image), but logs failures and
    /// returns `None` instead.
    pub async fn lookup(&self, query: &str) -> Option<String> {
        if query.is_empty() {
            return None;
        }
        match self.first_image(query).await {
            Ok(link) => {
                debug!(query, found = link.is_some(), "image search finished");
                link
            }
            Err(e) => {
                warn!(query, error = %e, "image search failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;

    fn config() -> ImageSearchConfig {
        ImageSearchConfig {
            enabled: true,
            endpoint: "http://search.test/v1".to_string(),
            api_key: Some("k".to_string()),
            engine_id: Some("cx1".to_string()),
        }
    }

    fn client(fetcher: StaticFetcher) -> ImageSearch {
        ImageSearch::from_config(&config(), Arc::new(fetcher))
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_from_config_inactive() {
        let fetcher: Arc<dyn Fetcher> = Arc::new(StaticFetcher::new());
        let disabled = ImageSearchConfig::default();
        assert!(ImageSearch::from_config(&disabled, fetcher)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_from_config_bad_endpoint() {
        let fetcher: Arc<dyn Fetcher> = Arc::new(StaticFetcher::new());
        let mut bad = config();
        bad.endpoint = "::".to_string();
        assert!(ImageSearch::from_config(&bad, fetcher).is_err());
    }

    #[test]
    fn test_request_url_parameters() {
        let url = client(StaticFetcher::new()).request_url("NACA 2412");
        assert_eq!(
            url.as_str(),
            "http://search.test/v1?q=NACA+2412&num=1&start=1&imgSize=large&searchType=image&key=k&cx=cx1"
        );
    }

    #[tokio::test]
    async fn test_first_image_takes_first_link() {
        let search = client(StaticFetcher::new());
        let url = search.request_url("E387");
        let search = client(StaticFetcher::new().body(
            url.as_str(),
            r#"{"items": [{"link": "https://img.test/1.png"}, {"link": "https://img.test/2.png"}]}"#,
        ));

        assert_eq!(
            search.first_image("E387").await.unwrap().as_deref(),
            Some("https://img.test/1.png")
        );
    }

    #[tokio::test]
    async fn test_first_image_without_items() {
        let search = client(StaticFetcher::new());
        let url = search.request_url("E387");
        let search = client(StaticFetcher::new().body(url.as_str(), r#"{"kind": "customsearch"}"#));

        assert_eq!(search.first_image("E387").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lookup_swallows_errors() {
        let search = client(StaticFetcher::new());
        let url = search.request_url("E387");
        let search = client(StaticFetcher::new().body(url.as_str(), "not json"));

        assert!(search.first_image("E387").await.is_err());
        assert_eq!(search.lookup("E387").await, None);
    }

    #[tokio::test]
    async fn test_failed_request_does_not_expose_api_key() {
        let mut secret = config();
        secret.api_key = Some("SECRETKEY123".to_string());
        let fetcher: Arc<dyn Fetcher> = Arc::new(StaticFetcher::new());
        let url = ImageSearch::from_config(&secret, fetcher)
            .unwrap()
            .unwrap()
            .request_url("E387");
        assert!(url.as_str().contains("SECRETKEY123"));

        let fetcher = Arc::new(StaticFetcher::new().status(url.as_str(), 403));
        let search = ImageSearch::from_config(&secret, fetcher).unwrap().unwrap();
        let err = search.first_image("E387").await.unwrap_err();

        assert!(matches!(err, Error::Transport { .. }));
        let text = err.to_string();
        assert!(text.contains("http://search.test/v1"));
        assert!(text.contains("403"));
        assert!(!text.contains("SECRETKEY123"));
        assert!(!text.contains("key="));
    }

    #[tokio::test]
    async fn test_lookup_empty_query() {
        let fetcher = Arc::new(StaticFetcher::new());
        let search = ImageSearch::from_config(&config(), fetcher.clone())
            .unwrap()
            .unwrap();

        assert_eq!(search.lookup("").await, None);
        assert_eq!(fetcher.request_count(), 0);
    }
}
