//! Configuration management for airfoilscout.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.
//! Flight parameters are not configuration: they are supplied per run.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "airfoilscout";

/// Environment variable prefix.
const ENV_PREFIX: &str = "AIRFOILSCOUT_";

/// The UIUC Airfoil Coordinates Database listing.
pub const DEFAULT_CATALOG_URL: &str = "https://m-selig.ae.illinois.edu/ads/coord_database.html";

/// Google Custom Search JSON API endpoint.
pub const DEFAULT_IMAGE_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `AIRFOILSCOUT_`, `__` between
///    section and key, e.g. `AIRFOILSCOUT_PIPELINE__CONCURRENCY`)
/// 2. TOML config file at `~/.config/airfoilscout/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog configuration.
    pub catalog: CatalogConfig,
    /// Pipeline configuration.
    pub pipeline: PipelineConfig,
    /// Image search configuration.
    pub image_search: ImageSearchConfig,
}

/// Catalog listing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// URL of the HTML listing page.
    pub url: String,
    /// Maximum number of entries to evaluate.
    /// Set to 0 for unlimited.
    pub max_entries: usize,
    /// Regex a link must match to count as a coordinate file.
    pub data_file_pattern: String,
    /// Regex a sibling link must match to count as a plot image.
    pub image_file_pattern: String,
    /// Token that introduces a reference note in an entry's text.
    pub reference_marker: String,
}

/// Fetch-and-score pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of coordinate files fetched at the same time.
    pub concurrency: usize,
    /// Per-request timeout in seconds.
    /// Set to 0 to disable.
    pub request_timeout_secs: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

/// Image search configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSearchConfig {
    /// Look up an image for the winning airfoil.
    pub enabled: bool,
    /// Search API endpoint.
    pub endpoint: String,
    /// API key. Image search is skipped when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Search engine identifier (`cx`). Image search is skipped when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_id: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CATALOG_URL.to_string(),
            max_entries: 0,
            data_file_pattern: r"(?i)\.dat$".to_string(),
            image_file_pattern: r"(?i)\.gif$".to_string(),
            reference_marker: "Ref".to_string(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: crate::pipeline::DEFAULT_CONCURRENCY,
            request_timeout_secs: 30,
            user_agent: concat!("airfoilscout/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for ImageSearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_IMAGE_SEARCH_ENDPOINT.to_string(),
            api_key: None,
            engine_id: None,
        }
    }
}

impl ImageSearchConfig {
    /// Check if image search can run.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && self.api_key.is_some() && self.engine_id.is_some()
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.concurrency == 0 {
            return Err(Error::config("concurrency must be greater than 0"));
        }

        if Url::parse(&self.catalog.url).is_err() {
            return Err(Error::config(format!(
                "invalid catalog url: {}",
                self.catalog.url
            )));
        }

        if Url::parse(&self.image_search.endpoint).is_err() {
            return Err(Error::config(format!(
                "invalid image search endpoint: {}",
                self.image_search.endpoint
            )));
        }

        for pattern in [
            &self.catalog.data_file_pattern,
            &self.catalog.image_file_pattern,
        ] {
            if regex::Regex::new(pattern).is_err() {
                return Err(Error::config(format!("invalid regex pattern: {pattern}")));
            }
        }

        if self.catalog.reference_marker.is_empty() {
            return Err(Error::config("reference_marker must not be empty"));
        }

        Ok(())
    }

    /// Get the request timeout, if one is configured.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        if self.pipeline.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.pipeline.request_timeout_secs))
        }
    }

    /// Get the maximum number of catalog entries, if bounded.
    #[must_use]
    pub fn max_entries(&self) -> Option<usize> {
        match self.catalog.max_entries {
            0 => None,
            n => Some(n),
        }
    }
}
