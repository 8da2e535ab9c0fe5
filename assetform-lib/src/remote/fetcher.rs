//! Fetching option data over HTTP.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::FetchError;

/// Capability to fetch a JSON body for a request URL.
///
/// The provider never inspects transport details; tests and hosts can plug
/// in their own implementation.
#[async_trait]
pub trait OptionFetcher: Send + Sync {
    /// Fetches and parses the JSON body at `url`.
    async fn fetch(&self, url: &str) -> Result<serde_json::Value, FetchError>;
}

/// An [`OptionFetcher`] backed by `reqwest`.
///
/// Relative request URLs (such as `/locations/campus/7`) are resolved against
/// the configured base URL. This fetcher is cheap to clone (uses `Arc`
/// internally).
///
/// # Example
///
/// ```ignore
/// let fetcher = HttpFetcher::builder()
///     .base_url("https://assets.example.com/api")
///     .bearer_token(token)
///     .timeout(Duration::from_secs(10))
///     .build()?;
///
/// let body = fetcher.fetch("/locations/campus/7").await?;
/// ```
#[derive(Clone)]
pub struct HttpFetcher {
    inner: Arc<HttpFetcherInner>,
}

struct HttpFetcherInner {
    base_url: String,
    bearer_token: Option<String>,
    http_client: Client,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    /// Creates a new builder for constructing a fetcher.
    pub fn builder() -> HttpFetcherBuilder<Missing> {
        HttpFetcherBuilder::new()
    }

    /// Returns the base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Resolves a request URL against the base URL.
    ///
    /// Absolute URLs are used as-is.
    pub fn resolve(&self, url: &str) -> Result<::url::Url, FetchError> {
        if let Ok(absolute) = ::url::Url::parse(url) {
            return Ok(absolute);
        }
        let joined = format!(
            "{}/{}",
            self.inner.base_url.trim_end_matches('/'),
            url.trim_start_matches('/')
        );
        Ok(::url::Url::parse(&joined)?)
    }
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("base_url", &self.inner.base_url)
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl OptionFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        let url = self.resolve(url)?;
        log::debug!("GET {}", url);

        let mut request = self.inner.http_client.get(url.as_str());

        if let Some(token) = &self.inner.bearer_token {
            request = request.bearer_auth(token);
        }
        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.inner.timeout.unwrap_or_default())
            } else {
                FetchError::from(e)
            }
        })?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(FetchError::http(status, body))
        }
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing an [`HttpFetcher`].
///
/// Uses the typestate pattern to ensure the base URL is set at compile time.
pub struct HttpFetcherBuilder<Url> {
    base_url: Url,
    bearer_token: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl HttpFetcherBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: Missing,
            bearer_token: None,
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }

    /// Sets the API base URL.
    pub fn base_url(self, url: impl Into<String>) -> HttpFetcherBuilder<Set<String>> {
        HttpFetcherBuilder {
            base_url: Set(url.into()),
            bearer_token: self.bearer_token,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl Default for HttpFetcherBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> HttpFetcherBuilder<U> {
    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl HttpFetcherBuilder<Set<String>> {
    /// Builds the [`HttpFetcher`].
    ///
    /// Fails if the base URL is not an absolute URL or the HTTP client cannot
    /// be created.
    pub fn build(self) -> Result<HttpFetcher, FetchError> {
        let base_url = self.base_url.0;
        ::url::Url::parse(&base_url)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(HttpFetcher {
            inner: Arc::new(HttpFetcherInner {
                base_url,
                bearer_token: self.bearer_token,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(base: &str) -> HttpFetcher {
        HttpFetcher::builder().base_url(base).build().unwrap()
    }

    #[test]
    fn test_resolve_relative_keeps_base_path() {
        let f = fetcher("https://assets.example.com/api/v1/");
        assert_eq!(
            f.resolve("/locations/campus/7").unwrap().as_str(),
            "https://assets.example.com/api/v1/locations/campus/7"
        );
        assert_eq!(
            f.resolve("assets?campusId=3").unwrap().as_str(),
            "https://assets.example.com/api/v1/assets?campusId=3"
        );
    }

    #[test]
    fn test_resolve_absolute_passthrough() {
        let f = fetcher("https://assets.example.com");
        assert_eq!(
            f.resolve("https://other.example.com/x").unwrap().as_str(),
            "https://other.example.com/x"
        );
    }

    #[test]
    fn test_build_rejects_relative_base() {
        let result = HttpFetcher::builder().base_url("/api").build();
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }
}
