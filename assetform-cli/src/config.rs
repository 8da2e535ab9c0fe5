//! CLI settings loaded from `config.toml`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use assetform_lib::cache::CacheConfig;
use assetform_lib::remote::HttpFetcher;
use serde::Deserialize;
use simplelog::LevelFilter;

use crate::error::CliError;

/// Contents of `config.toml`. Every section is optional.
///
/// ```toml
/// [api]
/// base_url = "https://assets.example.com/api"
/// timeout_secs = 10
/// bearer_token = "..."
///
/// [cache]
/// options_ttl_secs = 300
///
/// [log]
/// level = "debug"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub cache: CacheSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub bearer_token: Option<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
            bearer_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub options_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            options_ttl_secs: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(content)?)
    }

    /// Log level, falling back to `Info` for unrecognized names.
    pub fn level_filter(&self) -> LevelFilter {
        self.log.level.parse().unwrap_or(LevelFilter::Info)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::with_ttl(Duration::from_secs(self.cache.options_ttl_secs))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Builds the HTTP fetcher from the `[api]` section.
    pub fn fetcher(&self) -> Result<HttpFetcher, CliError> {
        let base_url = self.api.base_url.as_deref().ok_or(CliError::MissingBaseUrl)?;
        let mut builder = HttpFetcher::builder()
            .base_url(base_url)
            .timeout(self.fetch_timeout());
        if let Some(token) = &self.api.bearer_token {
            builder = builder.bearer_token(token);
        }
        Ok(builder.build()?)
    }
}
