//! Repository capability consumed by the application layer.

use async_trait::async_trait;

use crate::error::Result;
use crate::query::{ReadResult, Request};

/// Persistence port for one aggregate type.
///
/// Queries are structured descriptors ([`Request`]), never raw query strings.
/// Uniqueness invariants are enforced by a check-then-write pattern at this
/// boundary; a production backend should additionally carry storage-level
/// unique constraints, the application-level check is an early exit only.
#[async_trait]
pub trait Repository<T>: Send + Sync {
    async fn create(&self, entity: &T) -> Result<()>;

    /// Answer every named query in the request with a facet of rows.
    async fn read(&self, request: &Request) -> Result<ReadResult<T>>;

    /// Answer the first row of the first query, or `None`.
    async fn read_one(&self, request: &Request) -> Result<Option<T>>;

    async fn update(&self, entity: &T) -> Result<()>;

    async fn delete(&self, entity: &T) -> Result<()>;
}
