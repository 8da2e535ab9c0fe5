//! The remote option provider.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::future::Shared;

use crate::cache::CacheConfig;
use crate::cache::CacheProvider;
use crate::cache::InMemoryCache;
use crate::dependency::is_upstream_filled;
use crate::error::FetchError;
use crate::model::Entity;
use crate::model::FieldSpec;
use crate::model::SelectOption;
use crate::model::ValueMap;
use crate::response::CacheStatus;
use crate::response::Response;

use super::CacheKey;
use super::OptionFetcher;
use super::build_cache_key;
use super::build_field_url;
use super::shape_options;

/// The resolved request for one remote field (steps 1-3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRequest {
    /// The field the request belongs to.
    pub field: String,
    /// Request URL, `None` when fetching is disabled.
    pub url: Option<String>,
    /// Cache key partitioning the result.
    pub cache_key: CacheKey,
    /// Whether a fetch may be made.
    pub fetch_enabled: bool,
}

/// Resolves the request for a remote field without fetching.
///
/// Fetching is disabled for fields without an endpoint and for fields whose
/// `dependsOn` upstream value is falsy or blank.
pub fn resolve_request(spec: &FieldSpec, values: &ValueMap) -> OptionRequest {
    let gated_open = match &spec.depends_on {
        None => true,
        Some(dep) => is_upstream_filled(values, &dep.field),
    };
    let fetch_enabled = gated_open && spec.is_remote();

    OptionRequest {
        field: spec.name.clone(),
        url: if fetch_enabled {
            build_field_url(spec, values)
        } else {
            None
        },
        cache_key: build_cache_key(spec, values),
        fetch_enabled,
    }
}

/// Lifecycle of a remote option set.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FetchStatus {
    /// Fetching is disabled (no endpoint, or the upstream field is empty).
    #[default]
    Disabled,
    /// A fetch is outstanding.
    Loading,
    /// Options were fetched.
    Ready,
    /// The fetch failed; the option list is empty.
    Failed(FetchError),
}

/// The options currently available to a remote field.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteOptionSet {
    /// The field these options belong to.
    pub field: String,
    /// Shaped entities, in display order.
    pub items: Vec<Entity>,
    /// Key of the request that produced the items.
    pub cache_key: CacheKey,
    /// Whether the request was allowed to fetch.
    pub fetch_enabled: bool,
    /// Fetch lifecycle.
    pub status: FetchStatus,
    /// Where the data came from.
    pub cache: CacheStatus,
}

impl RemoteOptionSet {
    /// An empty set for a request that may not fetch.
    pub fn disabled(request: &OptionRequest) -> Self {
        Self::empty(request, FetchStatus::Disabled)
    }

    /// An empty set for a request whose fetch is outstanding.
    pub fn loading(request: &OptionRequest) -> Self {
        Self::empty(request, FetchStatus::Loading)
    }

    /// An empty set for a failed request.
    pub fn failed(request: &OptionRequest, error: FetchError) -> Self {
        Self::empty(request, FetchStatus::Failed(error))
    }

    fn empty(request: &OptionRequest, status: FetchStatus) -> Self {
        Self {
            field: request.field.clone(),
            items: Vec::new(),
            cache_key: request.cache_key.clone(),
            fetch_enabled: request.fetch_enabled,
            status,
            cache: CacheStatus::Bypassed,
        }
    }

    /// Returns `true` while a fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        matches!(self.status, FetchStatus::Loading)
    }

    /// Returns `true` if the fetch failed.
    pub fn is_error(&self) -> bool {
        matches!(self.status, FetchStatus::Failed(_))
    }

    /// Returns the fetch error, if any.
    pub fn error(&self) -> Option<&FetchError> {
        match &self.status {
            FetchStatus::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Projects the entities into `{value, label}` choices.
    pub fn choices(&self, label_key: &str, value_key: &str) -> Vec<SelectOption> {
        self.items
            .iter()
            .map(|item| SelectOption::new(item.value_of(value_key), item.label_of(label_key)))
            .collect()
    }
}

type SharedFetch = Shared<BoxFuture<'static, Result<Arc<serde_json::Value>, FetchError>>>;

/// Resolves remote options through a shared cache.
///
/// The cache is shared by every form using the provider; identical requests
/// (same [`CacheKey`]) issued while one is in flight join that fetch instead
/// of starting another. The provider is cheap to clone.
///
/// Expired entries are purged whenever a fresh body is stored, so keys for
/// upstream values nobody selects again do not pile up.
///
/// # Example
///
/// ```ignore
/// let provider = OptionProvider::new(fetcher)
///     .cache_config(CacheConfig::with_ttl(Duration::from_secs(60)))
///     .fetch_timeout(Duration::from_secs(10));
///
/// let set = provider.resolve_options(&spec, form.values(), None).await;
/// if set.is_error() {
///     // render the field empty with an error indicator
/// }
/// ```
#[derive(Clone)]
pub struct OptionProvider {
    fetcher: Arc<dyn OptionFetcher>,
    cache: Arc<dyn CacheProvider>,
    config: CacheConfig,
    fetch_timeout: Option<Duration>,
    inflight: Arc<DashMap<CacheKey, SharedFetch>>,
}

impl OptionProvider {
    /// Creates a provider with an in-memory cache and default TTL.
    pub fn new(fetcher: impl OptionFetcher + 'static) -> Self {
        Self::from_arc(Arc::new(fetcher))
    }

    /// Creates a provider from a shared fetcher.
    pub fn from_arc(fetcher: Arc<dyn OptionFetcher>) -> Self {
        Self {
            fetcher,
            cache: Arc::new(InMemoryCache::new()),
            config: CacheConfig::default(),
            fetch_timeout: None,
            inflight: Arc::new(DashMap::new()),
        }
    }

    /// Uses a custom cache provider.
    pub fn cache(mut self, cache: Arc<dyn CacheProvider>) -> Self {
        self.cache = cache;
        self
    }

    /// Sets the cache TTL configuration.
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Fails fetches that take longer than `timeout`.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Resolves the option set for a field.
    ///
    /// Never fails: fetch errors are reported through
    /// [`RemoteOptionSet::status`] with an empty item list.
    pub async fn resolve_options(
        &self,
        spec: &FieldSpec,
        values: &ValueMap,
        selected: Option<&Entity>,
    ) -> RemoteOptionSet {
        let request = resolve_request(spec, values);
        self.load(spec, &request, values, selected).await
    }

    /// Fetches and shapes the options for an already-resolved request.
    pub async fn load(
        &self,
        spec: &FieldSpec,
        request: &OptionRequest,
        values: &ValueMap,
        selected: Option<&Entity>,
    ) -> RemoteOptionSet {
        let Some(url) = request.url.as_deref().filter(|_| request.fetch_enabled) else {
            return RemoteOptionSet::disabled(request);
        };

        match self.fetch_body(&request.cache_key, url).await {
            Ok(response) => {
                let items = shape_options(spec, &response.body, values, selected);
                log::debug!(
                    "Options for '{}' ready: {} items ({:?})",
                    request.field,
                    items.len(),
                    response.cache
                );
                RemoteOptionSet {
                    field: request.field.clone(),
                    items,
                    cache_key: request.cache_key.clone(),
                    fetch_enabled: true,
                    status: FetchStatus::Ready,
                    cache: response.cache,
                }
            }
            Err(e) => {
                log::warn!("Options for '{}' failed: {}", request.field, e);
                RemoteOptionSet::failed(request, e)
            }
        }
    }

    /// Returns the response body for `key`, from cache, an in-flight fetch, or a new fetch.
    async fn fetch_body(
        &self,
        key: &CacheKey,
        url: &str,
    ) -> Result<Response<Arc<serde_json::Value>>, FetchError> {
        if self.config.is_enabled()
            && let Some(entry) = self.cache.lookup(key).await
        {
            log::debug!("Cache hit for {}", key);
            return Ok(Response::hit(entry));
        }

        let (shared, joined) = match self.inflight.get(key) {
            Some(entry) => (entry.value().clone(), true),
            None => {
                let fut = self.start_fetch(url.to_string());
                let fut = self.inflight.entry(key.clone()).or_insert(fut).value().clone();
                (fut, false)
            }
        };

        let result = shared.await;
        self.inflight.remove_if(key, |_, f| f.peek().is_some());
        let body = result?;

        if joined {
            log::debug!("Joined in-flight fetch for {}", key);
            return Ok(Response::new(body, CacheStatus::Shared));
        }

        match self.config.entry_for(&body) {
            Some(entry) => {
                let response = Response::stored(&entry);
                self.cache.store(key.clone(), entry).await;
                let purged = self.cache.gc().await;
                log::debug!("Cache miss for {}, stored ({} expired entries purged)", key, purged);
                Ok(response)
            }
            None => Ok(Response::new(body, CacheStatus::Bypassed)),
        }
    }

    fn start_fetch(&self, url: String) -> SharedFetch {
        let fetcher = Arc::clone(&self.fetcher);
        let timeout = self.fetch_timeout;
        async move {
            let body = match timeout {
                Some(limit) => tokio::time::timeout(limit, fetcher.fetch(&url))
                    .await
                    .map_err(|_| FetchError::Timeout(limit))??,
                None => fetcher.fetch(&url).await?,
            };
            Ok(Arc::new(body))
        }
        .boxed()
        .shared()
    }

    /// Drops the cached result for one key.
    pub async fn invalidate(&self, key: &CacheKey) -> bool {
        self.cache.evict(key).await
    }

    /// Drops every cached result derived from `field`.
    pub async fn invalidate_field(&self, field: &str) -> usize {
        self.cache.evict_field(field).await
    }
}

impl std::fmt::Debug for OptionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionProvider")
            .field("config", &self.config)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("inflight", &self.inflight.len())
            .finish_non_exhaustive()
    }
}
