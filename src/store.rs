use async_trait::async_trait;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Key/value store with expiry, shared by the weather cache and the
/// rate-limit counters. Atomicity of increments and set-with-expiry is
/// delegated to the backing store, so multiple service instances can share
/// one Redis without in-process locking.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Increments a counter, arming its expiry when the counter is created.
    /// Returns the count after the increment.
    async fn incr_ex(&self, key: &str, ttl: Duration) -> Result<u64, StoreError>;
}

pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(key, value, ttl.as_secs()).await?;
        Ok(())
    }

    async fn incr_ex(&self, key: &str, ttl: Duration) -> Result<u64, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let count: u64 = conn.incr(key, 1).await?;
        if count == 1 {
            let _: () = conn.expire(key, ttl.as_secs() as i64).await?;
        }
        Ok(count)
    }
}

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process store with the same expiry semantics as [`RedisStore`].
/// Used by the test suite and for keyless local runs; not suitable for
/// multi-instance deployments.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().await;
        if let Some(entry) = entries.get(key)
            && entry.expires_at > Instant::now()
        {
            return Ok(Some(entry.value.clone()));
        }
        Ok(None)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn incr_ex(&self, key: &str, ttl: Duration) -> Result<u64, StoreError> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();

        // Expiry stays armed from the first increment, matching
        // Redis INCR + EXPIRE fixed-window counters.
        if let Some(entry) = entries.get_mut(key)
            && entry.expires_at > now
        {
            let count = entry.value.parse::<u64>().unwrap_or(0) + 1;
            entry.value = count.to_string();
            return Ok(count);
        }

        entries.insert(
            key.to_string(),
            Entry {
                value: "1".to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn memory_store_serves_unexpired_entries() {
        let store = MemoryStore::new();
        store
            .set_ex("weather:Boston", r#"{"temp":72}"#, Duration::from_secs(60))
            .await
            .unwrap();

        let value = store.get("weather:Boston").await.unwrap();
        assert_eq!(value.as_deref(), Some(r#"{"temp":72}"#));
    }

    #[tokio::test(start_paused = true)]
    async fn memory_store_expires_entries() {
        let store = MemoryStore::new();
        store
            .set_ex("weather:Boston", r#"{"temp":72}"#, Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(store.get("weather:Boston").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn overwrite_replaces_value_and_expiry() {
        let store = MemoryStore::new();
        store
            .set_ex("weather:Boston", r#"{"temp":72}"#, Duration::from_secs(10))
            .await
            .unwrap();
        store
            .set_ex("weather:Boston", r#"{"temp":60}"#, Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;

        let value = store.get("weather:Boston").await.unwrap();
        assert_eq!(value.as_deref(), Some(r#"{"temp":60}"#));
    }

    #[tokio::test(start_paused = true)]
    async fn counter_increments_within_window() {
        let store = MemoryStore::new();
        let window = Duration::from_secs(60);

        assert_eq!(store.incr_ex("rate:10.0.0.1", window).await.unwrap(), 1);
        assert_eq!(store.incr_ex("rate:10.0.0.1", window).await.unwrap(), 2);
        assert_eq!(store.incr_ex("rate:10.0.0.1", window).await.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn counter_resets_after_window_elapses() {
        let store = MemoryStore::new();
        let window = Duration::from_secs(60);

        assert_eq!(store.incr_ex("rate:10.0.0.1", window).await.unwrap(), 1);
        assert_eq!(store.incr_ex("rate:10.0.0.1", window).await.unwrap(), 2);

        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(store.incr_ex("rate:10.0.0.1", window).await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn counters_are_independent_per_key() {
        let store = MemoryStore::new();
        let window = Duration::from_secs(60);

        assert_eq!(store.incr_ex("rate:10.0.0.1", window).await.unwrap(), 1);
        assert_eq!(store.incr_ex("rate:10.0.0.2", window).await.unwrap(), 1);
    }
}
