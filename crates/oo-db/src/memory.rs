//! In-memory table shared by the memory stores

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use oo_core::Id;
use tokio::sync::RwLock;

use crate::repository::{RepositoryError, RepositoryResult};

/// Rows keyed by id, ids handed out from 1 upwards
pub(crate) struct MemoryTable<T> {
    entity: &'static str,
    rows: RwLock<BTreeMap<Id, T>>,
    next_id: AtomicI64,
}

impl<T: Clone> MemoryTable<T> {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Stores the row built for a fresh id
    pub async fn insert(&self, build: impl FnOnce(Id) -> T) -> T {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let row = build(id);
        self.rows.write().await.insert(id, row.clone());
        row
    }

    pub async fn get(&self, id: Id) -> Option<T> {
        self.rows.read().await.get(&id).cloned()
    }

    /// Rows in id order
    pub async fn all(&self) -> Vec<T> {
        self.rows.read().await.values().cloned().collect()
    }

    pub async fn replace(&self, id: Option<Id>, row: T) -> RepositoryResult<T> {
        let id = id.ok_or_else(|| RepositoryError::unsaved(self.entity))?;
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(slot) => {
                *slot = row.clone();
                Ok(row)
            }
            None => Err(RepositoryError::not_found(self.entity, id)),
        }
    }

    pub async fn remove(&self, id: Id) -> RepositoryResult<T> {
        self.rows
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| RepositoryError::not_found(self.entity, id))
    }

    /// Removes every row matching `predicate`, returning them
    pub async fn remove_where(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        let mut rows = self.rows.write().await;
        let ids: Vec<Id> = rows
            .iter()
            .filter(|(_, row)| predicate(row))
            .map(|(id, _)| *id)
            .collect();
        ids.into_iter().filter_map(|id| rows.remove(&id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let table = MemoryTable::new("Row");
        let a = table.insert(|id| (id, "a")).await;
        let b = table.insert(|id| (id, "b")).await;
        assert_eq!(a.0, 1);
        assert_eq!(b.0, 2);
        assert_eq!(table.all().await.len(), 2);
    }

    #[tokio::test]
    async fn test_replace_missing_row() {
        let table: MemoryTable<i32> = MemoryTable::new("Row");
        assert!(matches!(
            table.replace(Some(9), 1).await,
            Err(RepositoryError::NotFound { id: 9, .. })
        ));
        assert!(matches!(
            table.replace(None, 1).await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_where() {
        let table = MemoryTable::new("Row");
        for n in 0..5 {
            table.insert(move |_| n).await;
        }
        let removed = table.remove_where(|n| n % 2 == 0).await;
        assert_eq!(removed, vec![0, 2, 4]);
        assert_eq!(table.all().await, vec![1, 3]);
    }
}
