//! Cache Coherence Layer
//!
//! Read-through, write-invalidate over [`CacheStore`]. The store stays
//! authoritative: reads fall back to it whenever the cache misses or fails,
//! and writes delete every key whose snapshot they change.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use kernel::id::{AccountId, PostId};
use platform::cache::CacheStore;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Every cached snapshot, one variant per key family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// `user:{id}`: profile with its posts and stats
    Profile(AccountId),
    /// `userPosts:{id}`
    AccountPosts(AccountId),
    /// `allPosts`
    AllPosts,
    /// `post:{id}`
    Post(PostId),
    /// `allUsers`
    AllAccounts,
}

impl CacheKey {
    pub fn ttl(&self) -> Duration {
        match self {
            CacheKey::Profile(_) | CacheKey::AllAccounts => Duration::from_secs(60 * 60),
            CacheKey::AccountPosts(_) => Duration::from_secs(30 * 60),
            CacheKey::AllPosts | CacheKey::Post(_) => Duration::from_secs(10 * 60),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Profile(id) => write!(f, "user:{id}"),
            CacheKey::AccountPosts(id) => write!(f, "userPosts:{id}"),
            CacheKey::AllPosts => f.write_str("allPosts"),
            CacheKey::Post(id) => write!(f, "post:{id}"),
            CacheKey::AllAccounts => f.write_str("allUsers"),
        }
    }
}

/// Keys a change to one post makes stale.
pub fn post_keys(post_id: PostId, owner: AccountId) -> [CacheKey; 4] {
    [
        CacheKey::Post(post_id),
        CacheKey::AllPosts,
        CacheKey::Profile(owner),
        CacheKey::AccountPosts(owner),
    ]
}

pub struct ReadThroughCache<C> {
    store: Arc<C>,
}

impl<C> Clone for ReadThroughCache<C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<C> ReadThroughCache<C>
where
    C: CacheStore + Send + Sync,
{
    pub fn new(store: Arc<C>) -> Self {
        Self { store }
    }

    /// Serve `key` from the cache, or run `load` and cache its result.
    ///
    /// Cache failures are logged and never fail the read. Errors from
    /// `load` are returned as is and nothing is cached.
    pub async fn get_or_load<T, E, F, Fut>(&self, key: CacheKey, load: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let cache_key = key.to_string();

        match CacheStore::get(&*self.store, &cache_key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<T>(&bytes) {
                Ok(value) => {
                    tracing::trace!(key = %cache_key, "Cache hit");
                    return Ok(value);
                }
                Err(e) => {
                    tracing::warn!(key = %cache_key, error = %e, "Unreadable cache entry, reloading");
                }
            },
            Ok(None) => {
                tracing::trace!(key = %cache_key, "Cache miss");
            }
            Err(e) => {
                tracing::warn!(key = %cache_key, error = %e, "Cache read failed, using store");
            }
        }

        let value = load().await?;

        match serde_json::to_vec(&value) {
            Ok(bytes) => {
                if let Err(e) = CacheStore::set(&*self.store, &cache_key, &bytes, key.ttl()).await {
                    tracing::warn!(key = %cache_key, error = %e, "Cache write failed");
                }
            }
            Err(e) => {
                tracing::error!(key = %cache_key, error = %e, "Snapshot serialization failed");
            }
        }

        Ok(value)
    }

    /// Delete every key, retrying each failed delete once.
    ///
    /// A key that still cannot be deleted is logged at error level; it
    /// expires with its TTL.
    pub async fn invalidate(&self, keys: impl IntoIterator<Item = CacheKey>) {
        let mut keys: Vec<String> = keys.into_iter().map(|k| k.to_string()).collect();
        keys.sort_unstable();
        keys.dedup();

        for key in &keys {
            if let Err(first) = CacheStore::del(&*self.store, key).await {
                tracing::warn!(key = %key, error = %first, "Cache invalidation failed, retrying");

                if let Err(second) = CacheStore::del(&*self.store, key).await {
                    tracing::error!(
                        key = %key,
                        error = %second,
                        "Cache invalidation failed twice, entry may be stale until TTL"
                    );
                }
            }
        }

        tracing::debug!(keys = ?keys, "Cache invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let account = AccountId::new();
        let post = PostId::new();
        assert_eq!(CacheKey::Profile(account).to_string(), format!("user:{account}"));
        assert_eq!(
            CacheKey::AccountPosts(account).to_string(),
            format!("userPosts:{account}")
        );
        assert_eq!(CacheKey::Post(post).to_string(), format!("post:{post}"));
        assert_eq!(CacheKey::AllPosts.to_string(), "allPosts");
        assert_eq!(CacheKey::AllAccounts.to_string(), "allUsers");
    }

    #[test]
    fn test_ttls() {
        let id = AccountId::new();
        assert_eq!(CacheKey::AllPosts.ttl(), Duration::from_secs(600));
        assert_eq!(CacheKey::Post(PostId::new()).ttl(), Duration::from_secs(600));
        assert_eq!(CacheKey::AccountPosts(id).ttl(), Duration::from_secs(1800));
        assert_eq!(CacheKey::Profile(id).ttl(), Duration::from_secs(3600));
        assert_eq!(CacheKey::AllAccounts.ttl(), Duration::from_secs(3600));
    }
}
