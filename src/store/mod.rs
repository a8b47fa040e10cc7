pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use memory::InMemoryStore;

/// Failures surfaced by a backing store. The REST layer maps these to 5xx
/// responses and never retries them.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Per-type data collection plus a separate unit-of-work commit.
///
/// `list` returns entities ordered by creation time ascending;
/// `created_after` is a keyset cursor (strictly greater than) and `limit`
/// truncates the page. Ordering must be deterministic for a fixed data set.
#[async_trait]
pub trait EntityStore<T>: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<T>, StoreError>;

    async fn list(
        &self,
        created_after: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<T>, StoreError>;

    /// Count of the whole type-scoped collection, ignoring any cursor.
    async fn count(&self) -> Result<i64, StoreError>;

    async fn insert(&self, entity: T) -> Result<(), StoreError>;

    async fn replace(&self, entity: T) -> Result<(), StoreError>;

    /// Returns whether an entity with `id` existed.
    async fn remove(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Flush one logical unit of work.
    async fn commit(&self) -> Result<(), StoreError>;
}
