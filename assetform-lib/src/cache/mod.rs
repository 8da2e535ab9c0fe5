//! Shared option cache
//!
//! Fetched response bodies are stored under the [`CacheKey`] of the request
//! that produced them. Because the key carries the upstream value and
//! parameters, a body fetched for a superseded value lands under a key the
//! current form no longer reads.

mod config;
mod memory;

pub use config::*;
pub use memory::*;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::remote::CacheKey;

/// One stored response body.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Raw response body, shared with every reader.
    pub body: Arc<serde_json::Value>,
    /// When the body was fetched and stored.
    pub stored_at: DateTime<Utc>,
    /// First instant at which the entry is no longer served.
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// An entry stored now that lives for `ttl`.
    pub fn new(body: Arc<serde_json::Value>, ttl: Duration) -> Self {
        Self::stored_at(body, Utc::now(), ttl)
    }

    /// An entry stored at `now` that lives for `ttl`.
    ///
    /// A TTL too large for `chrono` saturates at the maximum timestamp.
    pub fn stored_at(body: Arc<serde_json::Value>, now: DateTime<Utc>, ttl: Duration) -> Self {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            body,
            stored_at: now,
            expires_at,
        }
    }

    /// Returns `true` if the entry is expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Returns `true` if the entry has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Storage for fetched option bodies.
///
/// Implementations must never hand out an expired entry from
/// [`lookup`](Self::lookup). Every method takes `&self`; the store is shared
/// by every form and field holding the same provider.
#[async_trait]
pub trait CacheProvider: Send + Sync {
    /// The live entry for `key`, if any.
    async fn lookup(&self, key: &CacheKey) -> Option<CacheEntry>;

    /// Stores an entry, replacing any previous one.
    async fn store(&self, key: CacheKey, entry: CacheEntry);

    /// Drops the entry for `key`. Returns `true` if one existed.
    async fn evict(&self, key: &CacheKey) -> bool;

    /// Drops every entry whose key was derived from `field`.
    async fn evict_field(&self, field: &str) -> usize;

    /// Drops every entry.
    async fn clear(&self);

    /// Drops expired entries, returning how many were removed.
    async fn gc(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_expiry_boundaries() {
        let now = Utc::now();
        let entry = CacheEntry::stored_at(Arc::new(serde_json::Value::Null), now, Duration::from_secs(60));
        assert!(!entry.is_expired_at(now));
        assert!(!entry.is_expired_at(now + chrono::Duration::seconds(59)));
        assert!(entry.is_expired_at(now + chrono::Duration::seconds(60)));

        let forever = CacheEntry::stored_at(Arc::new(serde_json::Value::Null), now, Duration::MAX);
        assert_eq!(forever.expires_at, DateTime::<Utc>::MAX_UTC);
    }
}
