//! Where a fetched body came from

use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::cache::CacheEntry;

/// How the option provider obtained a response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CacheStatus {
    /// Fetched without touching the cache, or nothing was fetched at all.
    #[default]
    Bypassed,
    /// Fetched over the network and stored.
    Stored {
        /// When the body was stored.
        stored_at: DateTime<Utc>,
        /// When the stored body expires.
        expires_at: DateTime<Utc>,
    },
    /// Served from a live cache entry.
    Hit {
        /// When the body was originally stored.
        stored_at: DateTime<Utc>,
        /// When the entry expires.
        expires_at: DateTime<Utc>,
    },
    /// Joined an identical fetch another caller had in flight.
    Shared,
}

impl CacheStatus {
    /// Returns `true` if the body came from a live cache entry.
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. })
    }

    /// Returns `true` if the body was fetched and then stored.
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored { .. })
    }

    /// `true` when this caller did not trigger a network request.
    pub fn saved_request(&self) -> bool {
        matches!(self, Self::Hit { .. } | Self::Shared)
    }

    /// When the cached body expires, for stored and hit responses.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match *self {
            Self::Stored { expires_at, .. } | Self::Hit { expires_at, .. } => Some(expires_at),
            Self::Bypassed | Self::Shared => None,
        }
    }
}

/// A response body tagged with its [`CacheStatus`].
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The response body.
    pub body: T,
    /// How the body was obtained.
    pub cache: CacheStatus,
}

impl<T> Response<T> {
    /// Wraps a body with its cache status.
    pub fn new(body: T, cache: CacheStatus) -> Self {
        Self { body, cache }
    }

    /// Maps the body, keeping the cache status.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response::new(f(self.body), self.cache)
    }
}

impl Response<Arc<serde_json::Value>> {
    /// A body served from `entry`.
    pub fn hit(entry: CacheEntry) -> Self {
        Self::new(
            entry.body,
            CacheStatus::Hit {
                stored_at: entry.stored_at,
                expires_at: entry.expires_at,
            },
        )
    }

    /// A freshly fetched body that was just written as `entry`.
    pub fn stored(entry: &CacheEntry) -> Self {
        Self::new(
            Arc::clone(&entry.body),
            CacheStatus::Stored {
                stored_at: entry.stored_at,
                expires_at: entry.expires_at,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_status_follows_entry_times() {
        let entry = CacheEntry::new(Arc::new(serde_json::json!([])), Duration::from_secs(30));
        let stored = Response::stored(&entry);
        assert!(stored.cache.is_stored());
        assert!(!stored.cache.saved_request());
        assert_eq!(stored.cache.expires_at(), Some(entry.expires_at));

        let hit = Response::hit(entry.clone());
        assert!(hit.cache.is_hit());
        assert!(hit.cache.saved_request());
        assert!(Arc::ptr_eq(&hit.body, &entry.body));
    }

    #[test]
    fn test_serializes_with_status_tag() {
        let json = serde_json::to_value(CacheStatus::Shared).unwrap();
        assert_eq!(json, serde_json::json!({"status": "shared"}));
    }
}
