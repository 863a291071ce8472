//! User directory
//!
//! Read-only access to accounts, which are provisioned outside this service.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oo_core::{Entity, Id};
use oo_models::User;
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;

use crate::repository::{parse_column, RepositoryError, RepositoryResult};

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find(&self, id: Id) -> RepositoryResult<Option<User>>;

    /// Users among `ids`; unknown ids are skipped
    async fn find_many(&self, ids: &[Id]) -> RepositoryResult<Vec<User>>;

    /// Every user, by id
    async fn list(&self) -> RepositoryResult<Vec<User>>;
}

/// User database row
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> RepositoryResult<Self> {
        Ok(User {
            id: Some(row.id),
            name: row.name,
            email: row.email,
            role: parse_column(User::TYPE_NAME, &row.role)?,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

/// Postgres user directory
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find(&self, id: Id) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, role, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_many(&self, ids: &[Id]) -> RepositoryResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, role, created_at, updated_at
            FROM users
            WHERE id = ANY($1)
            ORDER BY id ASC
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn list(&self) -> RepositoryResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, role, created_at, updated_at FROM users ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }
}

/// In-memory user directory, seeded by the caller
#[derive(Default)]
pub struct MemoryUserDirectory {
    users: RwLock<BTreeMap<Id, User>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user; users without an id are ignored
    pub async fn add(&self, user: User) {
        if let Some(id) = user.id {
            self.users.write().await.insert(id, user);
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find(&self, id: Id) -> RepositoryResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[Id]) -> RepositoryResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| u.id.map_or(false, |id| ids.contains(&id)))
            .cloned()
            .collect())
    }

    async fn list(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.users.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oo_core::Role;

    #[tokio::test]
    async fn test_memory_directory() {
        let directory = MemoryUserDirectory::new();
        directory.add(User::new(2, "Dina", "dina@example.com", Role::Ga)).await;
        directory.add(User::new(1, "Budi", "budi@example.com", Role::User)).await;

        let found = directory.find(2).await.unwrap().unwrap();
        assert_eq!(found.role, Role::Ga);

        let many = directory.find_many(&[1, 7]).await.unwrap();
        assert_eq!(many.len(), 1);

        let names: Vec<_> = directory
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["Budi", "Dina"]);
    }
}
