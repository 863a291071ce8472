//! Todo store
//!
//! Database operations for todos.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use oo_core::{Entity, Id};
use oo_models::{Todo, TodoStatus};
use sqlx::{FromRow, PgPool};

use crate::memory::MemoryTable;
use crate::repository::{parse_column, persisted_id, RepositoryError, RepositoryResult};

/// Listing filter; `None` fields match everything
#[derive(Debug, Clone, Copy, Default)]
pub struct TodoFilter {
    pub user_id: Option<Id>,
    pub status: Option<TodoStatus>,
}

impl TodoFilter {
    pub fn for_user(user_id: Id) -> Self {
        Self {
            user_id: Some(user_id),
            status: None,
        }
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        self.user_id.map_or(true, |id| todo.user_id == id)
            && self.status.map_or(true, |status| todo.status == status)
    }
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Persists a new todo and returns it with its id
    async fn insert(&self, todo: &Todo) -> RepositoryResult<Todo>;

    async fn find(&self, id: Id) -> RepositoryResult<Option<Todo>>;

    /// Newest first
    async fn list(&self, filter: TodoFilter) -> RepositoryResult<Vec<Todo>>;

    async fn update(&self, todo: &Todo) -> RepositoryResult<Todo>;

    async fn delete(&self, id: Id) -> RepositoryResult<()>;

    /// Highest daily sequence among a user's todos created in `[start, end)`,
    /// 0 when there are none
    async fn max_daily_sequence(
        &self,
        user_id: Id,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<i32>;
}

/// Todo database row
#[derive(Debug, Clone, FromRow)]
pub struct TodoRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub scheduled_date: Option<NaiveDate>,
    pub status: String,
    pub daily_sequence: i32,
    pub started_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub total_work_time: Option<i64>,
    pub work_duration: Option<String>,
    pub evidence_paths: Vec<String>,
    pub checked_by: Option<i64>,
    pub checker_display: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TodoRow> for Todo {
    type Error = RepositoryError;

    fn try_from(row: TodoRow) -> RepositoryResult<Self> {
        Ok(Todo {
            id: Some(row.id),
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            due_date: row.due_date,
            scheduled_date: row.scheduled_date,
            status: parse_column(Todo::TYPE_NAME, &row.status)?,
            daily_sequence: row.daily_sequence,
            started_at: row.started_at,
            submitted_at: row.submitted_at,
            total_work_time: row.total_work_time,
            work_duration: row.work_duration,
            evidence_paths: row.evidence_paths,
            checked_by: row.checked_by,
            checker_display: row.checker_display,
            notes: row.notes,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

const TODO_COLUMNS: &str = r#"
    id, user_id, title, description, due_date, scheduled_date, status,
    daily_sequence, started_at, submitted_at, total_work_time, work_duration,
    evidence_paths, checked_by, checker_display, notes, created_at, updated_at
"#;

/// Postgres todo store
pub struct PgTodoStore {
    pool: PgPool,
}

impl PgTodoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn insert(&self, todo: &Todo) -> RepositoryResult<Todo> {
        let row = sqlx::query_as::<_, TodoRow>(&format!(
            r#"
            INSERT INTO todos (user_id, title, description, due_date, scheduled_date, status,
                               daily_sequence, started_at, submitted_at, total_work_time,
                               work_duration, evidence_paths, checked_by, checker_display, notes,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    COALESCE($16, NOW()), COALESCE($17, NOW()))
            RETURNING {}
            "#,
            TODO_COLUMNS
        ))
        .bind(todo.user_id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.due_date)
        .bind(todo.scheduled_date)
        .bind(todo.status.as_str())
        .bind(todo.daily_sequence)
        .bind(todo.started_at)
        .bind(todo.submitted_at)
        .bind(todo.total_work_time)
        .bind(&todo.work_duration)
        .bind(&todo.evidence_paths)
        .bind(todo.checked_by)
        .bind(&todo.checker_display)
        .bind(&todo.notes)
        .bind(todo.created_at)
        .bind(todo.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find(&self, id: Id) -> RepositoryResult<Option<Todo>> {
        let row = sqlx::query_as::<_, TodoRow>(&format!(
            "SELECT {} FROM todos WHERE id = $1",
            TODO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Todo::try_from).transpose()
    }

    async fn list(&self, filter: TodoFilter) -> RepositoryResult<Vec<Todo>> {
        let rows = sqlx::query_as::<_, TodoRow>(&format!(
            r#"
            SELECT {}
            FROM todos
            WHERE ($1::BIGINT IS NULL OR user_id = $1)
              AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC, id DESC
            "#,
            TODO_COLUMNS
        ))
        .bind(filter.user_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Todo::try_from).collect()
    }

    async fn update(&self, todo: &Todo) -> RepositoryResult<Todo> {
        let id = persisted_id(todo)?;
        let row = sqlx::query_as::<_, TodoRow>(&format!(
            r#"
            UPDATE todos
            SET title = $2, description = $3, due_date = $4, scheduled_date = $5,
                status = $6, daily_sequence = $7, started_at = $8, submitted_at = $9,
                total_work_time = $10, work_duration = $11, evidence_paths = $12,
                checked_by = $13, checker_display = $14, notes = $15,
                updated_at = COALESCE($16, NOW())
            WHERE id = $1
            RETURNING {}
            "#,
            TODO_COLUMNS
        ))
        .bind(id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.due_date)
        .bind(todo.scheduled_date)
        .bind(todo.status.as_str())
        .bind(todo.daily_sequence)
        .bind(todo.started_at)
        .bind(todo.submitted_at)
        .bind(todo.total_work_time)
        .bind(&todo.work_duration)
        .bind(&todo.evidence_paths)
        .bind(todo.checked_by)
        .bind(&todo.checker_display)
        .bind(&todo.notes)
        .bind(todo.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found(Todo::TYPE_NAME, id))?;

        row.try_into()
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(Todo::TYPE_NAME, id));
        }
        Ok(())
    }

    async fn max_daily_sequence(
        &self,
        user_id: Id,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<i32> {
        let max = sqlx::query_scalar::<_, i32>(
            "SELECT COALESCE(MAX(daily_sequence), 0) FROM todos \
             WHERE user_id = $1 AND created_at >= $2 AND created_at < $3",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(max)
    }
}

/// In-memory todo store
pub struct MemoryTodoStore {
    table: MemoryTable<Todo>,
}

impl Default for MemoryTodoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self {
            table: MemoryTable::new(Todo::TYPE_NAME),
        }
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn insert(&self, todo: &Todo) -> RepositoryResult<Todo> {
        Ok(self
            .table
            .insert(|id| Todo {
                id: Some(id),
                ..todo.clone()
            })
            .await)
    }

    async fn find(&self, id: Id) -> RepositoryResult<Option<Todo>> {
        Ok(self.table.get(id).await)
    }

    async fn list(&self, filter: TodoFilter) -> RepositoryResult<Vec<Todo>> {
        let mut todos: Vec<Todo> = self
            .table
            .all()
            .await
            .into_iter()
            .filter(|todo| filter.matches(todo))
            .collect();
        todos.reverse();
        Ok(todos)
    }

    async fn update(&self, todo: &Todo) -> RepositoryResult<Todo> {
        self.table.replace(todo.id, todo.clone()).await
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        self.table.remove(id).await.map(|_| ())
    }

    async fn max_daily_sequence(
        &self,
        user_id: Id,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<i32> {
        let max = self
            .table
            .all()
            .await
            .iter()
            .filter(|todo| todo.user_id == user_id)
            .filter(|todo| {
                todo.created_at
                    .map_or(false, |created| created >= start && created < end)
            })
            .map(|todo| todo.daily_sequence)
            .max();
        Ok(max.unwrap_or(0))
    }
}
