//! Key/Value Cache Backends
//!
//! Byte-oriented store with per-entry TTL. Callers own serialization.
//!
//! - [`RedisCache`]: shared across instances through a Redis connection manager
//! - [`LruCacheStore`]: in-process fallback for single-node and development runs

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(#[from] redis::RedisError),

    #[error("Cache lock poisoned")]
    Poisoned,
}

/// Minimal cache contract.
#[trait_variant::make(CacheStore: Send)]
pub trait LocalCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError>;

    /// Deleting a missing key is not an error.
    async fn del(&self, key: &str) -> Result<(), CacheError>;
}

// ============================================================================
// Redis
// ============================================================================

#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        // SETEX rejects 0
        let secs = ttl.as_secs().max(1);
        let _: () = conn.set_ex(key, value, secs).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }
}

// ============================================================================
// In-process LRU
// ============================================================================

struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// LRU map with lazy per-entry expiry.
pub struct LruCacheStore {
    cache: Mutex<LruCache<String, CacheEntry>>,
}

impl LruCacheStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    fn lookup(&self, key: &str, now: Instant) -> Result<Option<Vec<u8>>, CacheError> {
        let mut cache = self.cache.lock().map_err(|_| CacheError::Poisoned)?;
        match cache.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.value.clone())),
            Some(_) => {
                cache.pop(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

impl CacheStore for LruCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.lookup(key, Instant::now())
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let mut cache = self.cache.lock().map_err(|_| CacheError::Poisoned)?;
        cache.put(
            key.to_string(),
            CacheEntry {
                value: value.to_vec(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut cache = self.cache.lock().map_err(|_| CacheError::Poisoned)?;
        cache.pop(key);
        Ok(())
    }
}

// ============================================================================
// Runtime selection
// ============================================================================

/// Backend chosen at startup: Redis when configured, LRU otherwise.
pub enum CacheBackend {
    Redis(RedisCache),
    Memory(LruCacheStore),
}

impl CacheBackend {
    pub fn name(&self) -> &'static str {
        match self {
            CacheBackend::Redis(_) => "redis",
            CacheBackend::Memory(_) => "memory",
        }
    }
}

impl CacheStore for CacheBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        match self {
            CacheBackend::Redis(c) => CacheStore::get(c, key).await,
            CacheBackend::Memory(c) => CacheStore::get(c, key).await,
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        match self {
            CacheBackend::Redis(c) => CacheStore::set(c, key, value, ttl).await,
            CacheBackend::Memory(c) => CacheStore::set(c, key, value, ttl).await,
        }
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        match self {
            CacheBackend::Redis(c) => CacheStore::del(c, key).await,
            CacheBackend::Memory(c) => CacheStore::del(c, key).await,
        }
    }
}
