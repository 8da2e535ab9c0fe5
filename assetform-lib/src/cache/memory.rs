//! DashMap-backed cache

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::remote::CacheKey;

use super::CacheEntry;
use super::CacheProvider;

/// The default [`CacheProvider`]: a concurrent map living for the process.
///
/// Expired entries are dropped lazily on lookup, or in bulk by
/// [`gc`](CacheProvider::gc).
///
/// # Example
///
/// ```
/// use assetform_lib::cache::InMemoryCache;
///
/// let cache = InMemoryCache::new();
/// assert!(cache.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: DashMap<CacheKey, CacheEntry>,
}

impl InMemoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys currently stored, in sorted order.
    pub fn keys(&self) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    fn evict_where(&self, mut doomed: impl FnMut(&CacheKey, &CacheEntry) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, entry| !doomed(key, entry));
        before.saturating_sub(self.entries.len())
    }
}

#[async_trait]
impl CacheProvider for InMemoryCache {
    async fn lookup(&self, key: &CacheKey) -> Option<CacheEntry> {
        let now = Utc::now();
        if self
            .entries
            .remove_if(key, |_, entry| entry.is_expired_at(now))
            .is_some()
        {
            return None;
        }
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    async fn store(&self, key: CacheKey, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    async fn evict(&self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    async fn evict_field(&self, field: &str) -> usize {
        self.evict_where(|key, _| key.field() == Some(field))
    }

    async fn clear(&self) {
        self.entries.clear();
    }

    async fn gc(&self) -> usize {
        let now = Utc::now();
        self.evict_where(|_, entry| entry.is_expired_at(now))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    fn entry(ttl: Duration) -> CacheEntry {
        CacheEntry::new(Arc::new(json!({"data": []})), ttl)
    }

    #[tokio::test]
    async fn test_partitions_by_upstream_value() {
        let cache = InMemoryCache::new();
        let seven = CacheKey::new(["locationId", "7"]);

        cache.store(seven.clone(), entry(Duration::from_secs(60))).await;
        assert!(cache.lookup(&seven).await.is_some());
        assert!(cache.lookup(&CacheKey::new(["locationId", "9"])).await.is_none());

        assert!(cache.evict(&seven).await);
        assert!(!cache.evict(&seven).await);
    }

    #[tokio::test]
    async fn test_lookup_drops_expired_entry() {
        let cache = InMemoryCache::new();
        let key = CacheKey::new(["assets"]);
        cache.store(key.clone(), entry(Duration::ZERO)).await;
        assert_eq!(cache.len(), 1);

        assert!(cache.lookup(&key).await.is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_gc_and_evict_field() {
        let cache = InMemoryCache::new();
        cache.store(CacheKey::new(["roomId", "1"]), entry(Duration::ZERO)).await;
        cache.store(CacheKey::new(["roomId", "2"]), entry(Duration::from_secs(60))).await;
        cache.store(CacheKey::new(["users"]), entry(Duration::from_secs(60))).await;

        assert_eq!(cache.gc().await, 1);
        assert_eq!(cache.evict_field("roomId").await, 1);
        assert_eq!(cache.keys(), vec![CacheKey::new(["users"])]);
    }
}
