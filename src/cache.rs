use anyhow::{Result, anyhow};
use fjall::Keyspace;
use serde::Deserialize;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task;

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

/// Persistent TTL cache, opened once at startup and injected where needed.
///
/// Used to hold the location-repository snapshot between queries so repeated
/// searches do not re-query the repository inside the TTL window.
#[derive(Clone)]
pub struct PersistentCache {
    store: Keyspace,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> anyhow::Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

impl PersistentCache {
    /// Open (or create) the cache database at the given directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let items = db.keyspace("cache", fjall::KeyspaceCreateOptions::default)?;
        Ok(PersistentCache { store: items })
    }

    /// Stores a serializable value with a time-to-live (TTL).
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
    ) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let expires_at = SystemTime::now()
            .checked_add(ttl)
            .ok_or(anyhow!("TTL overflow"))?
            .duration_since(UNIX_EPOCH)?
            .as_secs();
        let entry = StoredEntry { value, expires_at };
        let bytes = postcard::to_stdvec(&entry)?;

        let _ = task::spawn_blocking(move || store.insert(key, bytes)).await?;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

        if let Some(bytes) = maybe_bytes {
            let entry: StoredEntry<T> = postcard::from_bytes(&bytes)?;
            let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

            if now < entry.expires_at {
                tracing::debug!("Key found and still fresh");
                Ok(Some(entry.value))
            } else {
                tracing::debug!("Key found but expired");
                self.remove(key).await?;
                Ok(None)
            }
        } else {
            tracing::debug!("Key not found");
            Ok(None)
        }
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        let _ = task::spawn_blocking(move || store.remove(key)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        cache
            .put("answer", 42u64, Duration::from_secs(60))
            .await
            .unwrap();
        let cached: Option<u64> = cache.get("answer").await.unwrap();
        assert_eq!(cached, Some(42));
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        cache
            .put("ephemeral", "gone".to_string(), Duration::from_secs(0))
            .await
            .unwrap();
        let cached: Option<String> = cache.get("ephemeral").await.unwrap();
        assert_eq!(cached, None);
    }

    #[tokio::test]
    async fn test_missing_key_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        let cached: Option<u64> = cache.get("nothing-here").await.unwrap();
        assert_eq!(cached, None);
    }
}
