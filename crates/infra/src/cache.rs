//! In-memory token cache.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use authora_core::{Cache, Error, Result, TokenRecord};

/// In-memory TTL cache for token records. Expiry is checked lazily on read.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, (TokenRecord, DateTime<Utc>)>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn save(&self, record: &TokenRecord, ttl: Duration) -> Result<()> {
        let expires_at = Utc::now() + ttl;
        let mut entries = self.entries.lock().await;
        entries.insert(record.key.clone(), (record.clone(), expires_at));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<TokenRecord>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((_, expires_at)) if *expires_at <= Utc::now() => {
                entries.remove(key);
                Ok(None)
            }
            Some((record, _)) => Ok(Some(record.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        if entries.remove(key).is_none() {
            return Err(Error::not_found(format!("cache key {key}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str) -> TokenRecord {
        TokenRecord::new(key, "user-1", "tenant-1", "access", "signed.jwt")
    }

    #[tokio::test]
    async fn save_then_get_round_trips() {
        let cache = InMemoryCache::new();
        cache.save(&record("k1"), Duration::minutes(15)).await.unwrap();
        let got = cache.get("k1").await.unwrap().unwrap();
        assert_eq!(got.user, "user-1");
    }

    #[tokio::test]
    async fn expired_entry_reads_as_miss() {
        let cache = InMemoryCache::new();
        cache.save(&record("k1"), Duration::seconds(-1)).await.unwrap();
        assert!(cache.get("k1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_of_absent_key_errors() {
        let cache = InMemoryCache::new();
        cache.save(&record("k1"), Duration::minutes(15)).await.unwrap();
        cache.delete("k1").await.unwrap();
        assert!(cache.delete("k1").await.is_err());
    }
}
