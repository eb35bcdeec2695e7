//! Configuration for the API client and the search session.
//!
//! Configuration is read from an optional YAML file and then overridden by
//! command-line flags / environment variables (see the binary's `cli`
//! module). It is always passed explicitly: [`NewsApiConfig`] to the API
//! client and [`SearchConfig`] to the session.
//!
//! ```yaml
//! news_api:
//!   api_key: "xxxxxxxx"
//!   base_url: "https://newsapi.org/v2/everything"
//!   timeout_secs: 30
//! search:
//!   debounce_ms: 500
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2/everything";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("no NewsAPI key configured (set news_api.api_key, --api-key or NEWS_API_KEY)")]
    MissingApiKey,
    #[error("invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Inputs of the API client adapter.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl NewsApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Timing of the reactive session.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period after the last keyword edit before it is searched.
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub news_api: NewsApiConfig,
    pub search: SearchConfig,
}

impl AppConfig {
    /// Load from `path`, or start from defaults when no file is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Apply values that came from flags or the environment.
    pub fn with_overrides(
        mut self,
        api_key: Option<String>,
        base_url: Option<String>,
        debounce_ms: Option<u64>,
    ) -> Self {
        if let Some(key) = api_key {
            self.news_api.api_key = key;
        }
        if let Some(url) = base_url {
            self.news_api.base_url = url;
        }
        if let Some(ms) = debounce_ms {
            self.search.debounce_ms = ms;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.news_api.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        url::Url::parse(&self.news_api.base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: self.news_api.base_url.clone(),
            source,
        })?;
        Ok(())
    }
}
