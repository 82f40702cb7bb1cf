//! Revocation store: a TTL-keyed cache of tokens that must be treated as
//! invalid before they expire naturally.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum RevocationError {
    #[error("Revocation store unavailable: {0}")]
    Unavailable(String),

    #[error("Revocation store operation timed out")]
    Timeout,
}

#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool, RevocationError>;

    /// Stores `value` under `key` for `ttl`. A zero TTL stores nothing.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), RevocationError>;

    /// Atomic insert-if-absent. `true` only for the one caller that stored
    /// the key; a zero TTL stores nothing and returns `false`.
    async fn claim(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, RevocationError>;
}

/// Process-local store; every write sweeps expired entries.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.read().await.values().filter(|(_, expires)| *expires > now).count()
    }
}

fn sweep(entries: &mut HashMap<String, (String, Instant)>, now: Instant) {
    entries.retain(|_, (_, expires)| *expires > now);
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn exists(&self, key: &str) -> Result<bool, RevocationError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(matches!(entries.get(key), Some((_, expires)) if *expires > now))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), RevocationError> {
        if ttl.is_zero() {
            return Ok(());
        }
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        sweep(&mut entries, now);
        entries.insert(key.to_string(), (value.to_string(), now + ttl));
        Ok(())
    }

    async fn claim(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, RevocationError> {
        if ttl.is_zero() {
            return Ok(false);
        }
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        sweep(&mut entries, now);
        match entries.entry(key.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert((value.to_string(), now + ttl));
                Ok(true)
            }
        }
    }
}

#[cfg(feature = "redis")]
pub use self::redis_store::RedisRevocationStore;

#[cfg(feature = "redis")]
mod redis_store {
    use std::time::Duration;

    use async_trait::async_trait;
    use bb8_redis::{bb8, redis, RedisConnectionManager};

    use super::{RevocationError, RevocationStore};

    /// Redis-backed store shared across processes.
    #[derive(Clone)]
    pub struct RedisRevocationStore {
        pool: bb8::Pool<RedisConnectionManager>,
    }

    impl RedisRevocationStore {
        pub async fn connect(redis_url: &str) -> Result<Self, RevocationError> {
            let manager = RedisConnectionManager::new(redis_url)
                .map_err(|e| RevocationError::Unavailable(e.to_string()))?;
            let pool = bb8::Pool::builder()
                .build(manager)
                .await
                .map_err(|e| RevocationError::Unavailable(e.to_string()))?;
            Ok(Self { pool })
        }
    }

    #[async_trait]
    impl RevocationStore for RedisRevocationStore {
        async fn exists(&self, key: &str) -> Result<bool, RevocationError> {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|e| RevocationError::Unavailable(e.to_string()))?;
            let found: i64 = redis::cmd("EXISTS")
                .arg(key)
                .query_async(&mut *conn)
                .await
                .map_err(|e| RevocationError::Unavailable(e.to_string()))?;
            Ok(found > 0)
        }

        async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), RevocationError> {
            let seconds = ttl.as_secs().max(u64::from(ttl.subsec_nanos() > 0));
            if seconds == 0 {
                return Ok(());
            }
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|e| RevocationError::Unavailable(e.to_string()))?;
            let _: () = redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("EX")
                .arg(seconds)
                .query_async(&mut *conn)
                .await
                .map_err(|e| RevocationError::Unavailable(e.to_string()))?;
            Ok(())
        }

        async fn claim(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, RevocationError> {
            let seconds = ttl.as_secs().max(u64::from(ttl.subsec_nanos() > 0));
            if seconds == 0 {
                return Ok(false);
            }
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|e| RevocationError::Unavailable(e.to_string()))?;
            // SET .. NX replies nil when the key already exists
            let reply: Option<String> = redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("EX")
                .arg(seconds)
                .arg("NX")
                .query_async(&mut *conn)
                .await
                .map_err(|e| RevocationError::Unavailable(e.to_string()))?;
            Ok(reply.is_some())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let store = InMemoryRevocationStore::new();
        store.set("k", "revoked", Duration::from_millis(30)).await.unwrap();
        assert!(store.exists("k").await.unwrap());
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!store.exists("k").await.unwrap());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn writes_sweep_expired_entries() {
        let store = InMemoryRevocationStore::new();
        for i in 0..100 {
            store.set(&format!("old-{}", i), "revoked", Duration::from_millis(5)).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(30)).await;
        for i in 0..100 {
            assert!(!store.exists(&format!("absent-{}", i)).await.unwrap());
        }
        store.set("fresh", "revoked", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.entries.read().await.len(), 1);

        tokio::time::sleep(Duration::from_millis(10)).await;
        store.set("short", "revoked", Duration::from_millis(5)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(store.claim("other", "revoked", Duration::from_secs(60)).await.unwrap());
        assert_eq!(store.entries.read().await.len(), 2);
    }

    #[tokio::test]
    async fn claim_succeeds_once_per_key() {
        let store = InMemoryRevocationStore::new();
        assert!(store.claim("k", "revoked", Duration::from_secs(60)).await.unwrap());
        assert!(!store.claim("k", "revoked", Duration::from_secs(60)).await.unwrap());
        assert!(store.exists("k").await.unwrap());
        assert!(!store.claim("z", "revoked", Duration::ZERO).await.unwrap());
    }

    #[tokio::test]
    async fn expired_claim_can_be_taken_again() {
        let store = InMemoryRevocationStore::new();
        assert!(store.claim("k", "revoked", Duration::from_millis(5)).await.unwrap());
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(store.claim("k", "revoked", Duration::from_secs(60)).await.unwrap());
    }

    #[tokio::test]
    async fn zero_ttl_stores_nothing() {
        let store = InMemoryRevocationStore::new();
        store.set("k", "revoked", Duration::ZERO).await.unwrap();
        assert!(!store.exists("k").await.unwrap());
    }
}
