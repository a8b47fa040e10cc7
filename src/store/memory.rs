use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EntityStore, StoreError};
use crate::entity::Entity;

/// Hash-map backed store used by the default server wiring and by tests.
#[derive(Debug)]
pub struct InMemoryStore<T> {
    rows: RwLock<HashMap<Uuid, T>>,
    commits: AtomicU64,
}

impl<T> InMemoryStore<T> {
    pub fn new() -> Self {
        Self { rows: RwLock::new(HashMap::new()), commits: AtomicU64::new(0) }
    }

    /// How many units of work have been flushed. Tests use this to assert
    /// that a rejected request never committed.
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::SeqCst)
    }
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> EntityStore<T> for InMemoryStore<T>
where
    T: Entity + Clone + Send + Sync + 'static,
{
    async fn find(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn list(
        &self,
        created_after: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<T>, StoreError> {
        let rows = self.rows.read().await;
        let mut page: Vec<T> = rows
            .values()
            .filter(|entity| match created_after {
                Some(cursor) => entity.created_at() > cursor,
                None => true,
            })
            .cloned()
            .collect();
        // Id tie-break keeps the ordering deterministic for a fixed data set.
        page.sort_by_key(|entity| (entity.created_at(), entity.id()));
        if let Some(limit) = limit {
            page.truncate(limit);
        }
        Ok(page)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.rows.read().await.len() as i64)
    }

    async fn insert(&self, entity: T) -> Result<(), StoreError> {
        self.rows.write().await.insert(entity.id(), entity);
        Ok(())
    }

    async fn replace(&self, entity: T) -> Result<(), StoreError> {
        self.rows.write().await.insert(entity.id(), entity);
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }

    async fn commit(&self) -> Result<(), StoreError> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
