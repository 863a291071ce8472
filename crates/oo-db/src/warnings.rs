//! Todo warning store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oo_core::{Entity, Id};
use oo_models::TodoWarning;
use sqlx::{FromRow, PgPool};

use crate::memory::MemoryTable;
use crate::repository::{parse_column, RepositoryError, RepositoryResult};

#[async_trait]
pub trait WarningStore: Send + Sync {
    async fn insert(&self, warning: &TodoWarning) -> RepositoryResult<TodoWarning>;

    /// Oldest first
    async fn list_for_todo(&self, todo_id: Id) -> RepositoryResult<Vec<TodoWarning>>;

    /// Warnings created in `[start, end)`, optionally for one user
    async fn list_between(
        &self,
        user_id: Option<Id>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<TodoWarning>>;

    /// Returns the number of removed warnings
    async fn delete_for_todo(&self, todo_id: Id) -> RepositoryResult<u64>;
}

#[derive(Debug, Clone, FromRow)]
pub struct WarningRow {
    pub id: i64,
    pub todo_id: i64,
    pub user_id: i64,
    pub evaluator_id: i64,
    pub points: i32,
    pub level: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<WarningRow> for TodoWarning {
    type Error = RepositoryError;

    fn try_from(row: WarningRow) -> RepositoryResult<Self> {
        Ok(TodoWarning {
            id: Some(row.id),
            todo_id: row.todo_id,
            user_id: row.user_id,
            evaluator_id: row.evaluator_id,
            points: row.points,
            level: parse_column(TodoWarning::TYPE_NAME, &row.level)?,
            note: row.note,
            created_at: Some(row.created_at),
        })
    }
}

/// Postgres warning store
pub struct PgWarningStore {
    pool: PgPool,
}

impl PgWarningStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WarningStore for PgWarningStore {
    async fn insert(&self, warning: &TodoWarning) -> RepositoryResult<TodoWarning> {
        let row = sqlx::query_as::<_, WarningRow>(
            r#"
            INSERT INTO todo_warnings (todo_id, user_id, evaluator_id, points, level, note, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()))
            RETURNING id, todo_id, user_id, evaluator_id, points, level, note, created_at
            "#,
        )
        .bind(warning.todo_id)
        .bind(warning.user_id)
        .bind(warning.evaluator_id)
        .bind(warning.points)
        .bind(warning.level.as_str())
        .bind(&warning.note)
        .bind(warning.created_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn list_for_todo(&self, todo_id: Id) -> RepositoryResult<Vec<TodoWarning>> {
        let rows = sqlx::query_as::<_, WarningRow>(
            r#"
            SELECT id, todo_id, user_id, evaluator_id, points, level, note, created_at
            FROM todo_warnings
            WHERE todo_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(todo_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TodoWarning::try_from).collect()
    }

    async fn list_between(
        &self,
        user_id: Option<Id>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<TodoWarning>> {
        let rows = sqlx::query_as::<_, WarningRow>(
            r#"
            SELECT id, todo_id, user_id, evaluator_id, points, level, note, created_at
            FROM todo_warnings
            WHERE ($1::BIGINT IS NULL OR user_id = $1)
              AND created_at >= $2 AND created_at < $3
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TodoWarning::try_from).collect()
    }

    async fn delete_for_todo(&self, todo_id: Id) -> RepositoryResult<u64> {
        let result = sqlx::query("DELETE FROM todo_warnings WHERE todo_id = $1")
            .bind(todo_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// In-memory warning store
pub struct MemoryWarningStore {
    table: MemoryTable<TodoWarning>,
}

impl Default for MemoryWarningStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWarningStore {
    pub fn new() -> Self {
        Self {
            table: MemoryTable::new(TodoWarning::TYPE_NAME),
        }
    }
}

#[async_trait]
impl WarningStore for MemoryWarningStore {
    async fn insert(&self, warning: &TodoWarning) -> RepositoryResult<TodoWarning> {
        Ok(self
            .table
            .insert(|id| TodoWarning {
                id: Some(id),
                ..warning.clone()
            })
            .await)
    }

    async fn list_for_todo(&self, todo_id: Id) -> RepositoryResult<Vec<TodoWarning>> {
        Ok(self
            .table
            .all()
            .await
            .into_iter()
            .filter(|w| w.todo_id == todo_id)
            .collect())
    }

    async fn list_between(
        &self,
        user_id: Option<Id>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<TodoWarning>> {
        Ok(self
            .table
            .all()
            .await
            .into_iter()
            .filter(|w| user_id.map_or(true, |id| w.user_id == id))
            .filter(|w| w.created_at.map_or(false, |at| at >= start && at < end))
            .collect())
    }

    async fn delete_for_todo(&self, todo_id: Id) -> RepositoryResult<u64> {
        let removed = self.table.remove_where(|w| w.todo_id == todo_id).await;
        Ok(removed.len() as u64)
    }
}
