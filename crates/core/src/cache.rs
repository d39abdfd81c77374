//! Token cache capability.

use async_trait::async_trait;
use chrono::Duration;

use crate::error::Result;
use crate::token::TokenRecord;

/// Externally synchronized key/value cache for token records.
///
/// The core issues independent save/get/delete calls with no client-side
/// locking; unique per-token keys avoid contention.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Store a record under its opaque key for `ttl`.
    async fn save(&self, record: &TokenRecord, ttl: Duration) -> Result<()>;

    /// Look a record up; `None` on miss or expiry.
    async fn get(&self, key: &str) -> Result<Option<TokenRecord>>;

    /// Delete a record. Deleting an absent key is an error; logout relies
    /// on this to report an already-revoked session.
    async fn delete(&self, key: &str) -> Result<()>;
}
