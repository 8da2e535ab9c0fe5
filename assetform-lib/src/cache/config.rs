//! Cache lifetime settings

use std::sync::Arc;
use std::time::Duration;

use super::CacheEntry;

/// How long fetched option lists stay cached.
///
/// A zero TTL turns caching off: every request fetches, while identical
/// requests in flight at the same moment are still shared.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use assetform_lib::cache::CacheConfig;
///
/// assert!(CacheConfig::with_ttl(Duration::from_secs(60)).is_enabled());
/// assert!(!CacheConfig::disabled().is_enabled());
/// assert_eq!(CacheConfig::default().ttl, Duration::from_secs(300));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Lifetime of a stored option list. Zero disables caching.
    pub ttl: Duration,
}

impl CacheConfig {
    /// Five minutes.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

    /// Caches option lists for `ttl`.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// Never stores option lists.
    pub fn disabled() -> Self {
        Self::with_ttl(Duration::ZERO)
    }

    /// Returns `true` if fetched bodies are stored.
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// The entry to store for a freshly fetched body, `None` when disabled.
    pub fn entry_for(&self, body: &Arc<serde_json::Value>) -> Option<CacheEntry> {
        self.is_enabled()
            .then(|| CacheEntry::new(Arc::clone(body), self.ttl))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::with_ttl(Self::DEFAULT_TTL)
    }
}
