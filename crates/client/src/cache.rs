//! Key-value cache wrappers with soft-fail semantics.
//!
//! The cache is an optimization, never a dependency: read errors degrade to
//! a miss, write errors are logged and dropped, and no cache failure may
//! abort a request. Policy (key naming, TTLs) lives in `mgnrega_core::keys`;
//! this module owns only I/O.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tokio::sync::Mutex;

/// Read/write access to a key-value cache with per-entry TTL.
#[async_trait]
pub trait KvCache: Send + Sync {
    /// Fetch a cached JSON value. Any failure is a miss.
    async fn get_json(&self, key: &str) -> Option<String>;

    /// Store a JSON value with a TTL, best-effort.
    async fn put_json(&self, key: &str, value: &str, ttl_secs: u64);
}

/// Redis-backed cache client.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Connect to Redis at the given URL.
    ///
    /// The connection manager reconnects on its own after transient drops;
    /// individual operations still soft-fail while it is down.
    pub async fn connect(url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl KvCache for RedisCache {
    async fn get_json(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    async fn put_json(&self, key: &str, value: &str, ttl_secs: u64) {
        let mut conn = self.conn.clone();
        if let Err(e) = conn.set_ex::<_, _, ()>(key, value, ttl_secs).await {
            tracing::warn!(key, error = %e, "cache write failed, dropping entry");
        }
    }
}

/// In-process cache used by tests and cache-less deployments.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvCache for MemoryCache {
    async fn get_json(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn put_json(&self, key: &str, value: &str, ttl_secs: u64) {
        let expires_at = Instant::now() + Duration::from_secs(ttl_secs);
        self.entries
            .lock()
            .await
            .insert(key.to_string(), (value.to_string(), expires_at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_cache_roundtrip() {
        let cache = MemoryCache::new();
        cache.put_json("district:UP:LUCKNOW:2024-2025", r#"{"x":1}"#, 60).await;

        let value = cache.get_json("district:UP:LUCKNOW:2024-2025").await;
        assert_eq!(value.as_deref(), Some(r#"{"x":1}"#));
    }

    #[tokio::test]
    async fn test_memory_cache_miss() {
        let cache = MemoryCache::new();
        assert!(cache.get_json("absent").await.is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_expiry() {
        let cache = MemoryCache::new();
        cache.put_json("short", "v", 0).await;
        assert!(cache.get_json("short").await.is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_overwrite() {
        let cache = MemoryCache::new();
        cache.put_json("k", "old", 60).await;
        cache.put_json("k", "new", 60).await;
        assert_eq!(cache.get_json("k").await.as_deref(), Some("new"));
    }
}
