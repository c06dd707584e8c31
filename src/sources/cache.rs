//! Short-lived memoization of news source fetches.
//!
//! Identical search requests inside the time-to-live window are answered
//! from memory instead of hitting the network again. Eviction is purely
//! time based: an entry is dropped the first time it is found expired, and
//! every insert sweeps out all expired entries. There is no size bound.
//!
//! Failures are never cached.

use crate::errors::FetchError;
use crate::models::RawArticle;
use crate::sources::{NewsSource, SearchRequest};
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Default time-to-live for cached search results.
pub const DEFAULT_TTL: Duration = Duration::from_secs(1800);

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// A map whose entries expire `ttl` after insertion.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, CacheEntry<V>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.insert_at(key, value, Instant::now())
    }

    fn get_at(&mut self, key: &K, now: Instant) -> Option<V> {
        let expired = self.entries.get(key)?.is_expired(now);
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|e| e.value.clone())
    }

    fn insert_at(&mut self, key: K, value: V, now: Instant) {
        self.entries.retain(|_, e| !e.is_expired(now));
        self.entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Wraps a [`NewsSource`] with a [`TtlCache`] keyed on the full request.
pub struct CachedSource<S> {
    inner: S,
    cache: TtlCache<SearchRequest, Vec<RawArticle>>,
}

impl<S: NewsSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            cache: TtlCache::new(ttl),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    #[instrument(level = "info", skip_all, fields(source = self.inner.name(), query = %request.query))]
    pub async fn search(&mut self, request: &SearchRequest) -> Result<Vec<RawArticle>, FetchError> {
        if let Some(hit) = self.cache.get(request) {
            debug!(count = hit.len(), "Served search from cache");
            return Ok(hit);
        }
        let fresh = self.inner.search(request).await?;
        self.cache.insert(request.clone(), fresh.clone());
        debug!(count = fresh.len(), entries = self.cache.len(), "Cached search result");
        Ok(fresh)
    }
}
