use crate::{
    api::{params::SearchParams, source::SearchSource},
    error::ApiError,
};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: JsonValue,
    stored_at: Instant,
}

/// Search payloads keyed by the digest of their parameters, each valid for `ttl`.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Returns a live entry; an expired one is evicted.
    pub fn get_at(&mut self, key: &str, now: Instant) -> Option<JsonValue> {
        let expired = match self.entries.get(key) {
            Some(entry) if now.duration_since(entry.stored_at) < self.ttl => {
                return Some(entry.payload.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    pub fn insert_at(&mut self, key: String, payload: JsonValue, now: Instant) {
        self.entries.insert(
            key,
            CacheEntry {
                payload,
                stored_at: now,
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Memoizes a search source. Failed searches are never cached.
pub struct CachedSource<S> {
    inner: S,
    cache: Mutex<ResponseCache>,
}

impl<S: SearchSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Mutex::new(ResponseCache::new(ttl)),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub async fn cached_entries(&self) -> usize {
        self.cache.lock().await.len()
    }
}

#[async_trait]
impl<S: SearchSource> SearchSource for CachedSource<S> {
    async fn search(&self, params: &SearchParams) -> Result<JsonValue, ApiError> {
        let key = params.cache_key()?;
        if let Some(hit) = self.cache.lock().await.get_at(&key, Instant::now()) {
            debug!("Cache hit for {}", key);
            return Ok(hit);
        }

        debug!("Cache miss for {}", key);
        let payload = self.inner.search(params).await?;
        self.cache
            .lock()
            .await
            .insert_at(key, payload.clone(), Instant::now());
        Ok(payload)
    }

    async fn logout(&self) {
        self.cache.lock().await.clear();
        self.inner.logout().await;
    }
}
