//! Request item store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oo_core::{Entity, Id};
use oo_models::RequestItem;
use sqlx::{FromRow, PgPool};

use crate::memory::MemoryTable;
use crate::repository::{parse_column, persisted_id, RepositoryError, RepositoryResult};

#[async_trait]
pub trait RequestItemStore: Send + Sync {
    async fn insert(&self, item: &RequestItem) -> RepositoryResult<RequestItem>;

    async fn find(&self, id: Id) -> RepositoryResult<Option<RequestItem>>;

    /// Newest first; `requester` limits the list to one user
    async fn list(&self, requester: Option<Id>) -> RepositoryResult<Vec<RequestItem>>;

    async fn update(&self, item: &RequestItem) -> RepositoryResult<RequestItem>;
}

#[derive(Debug, Clone, FromRow)]
pub struct RequestItemRow {
    pub id: i64,
    pub user_id: i64,
    pub item_name: String,
    pub quantity: i32,
    pub reason: Option<String>,
    pub status: String,
    pub ga_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RequestItemRow> for RequestItem {
    type Error = RepositoryError;

    fn try_from(row: RequestItemRow) -> RepositoryResult<Self> {
        Ok(RequestItem {
            id: Some(row.id),
            user_id: row.user_id,
            item_name: row.item_name,
            quantity: row.quantity,
            reason: row.reason,
            status: parse_column(RequestItem::TYPE_NAME, &row.status)?,
            ga_note: row.ga_note,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

const COLUMNS: &str =
    "id, user_id, item_name, quantity, reason, status, ga_note, created_at, updated_at";

/// Postgres request item store
pub struct PgRequestItemStore {
    pool: PgPool,
}

impl PgRequestItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestItemStore for PgRequestItemStore {
    async fn insert(&self, item: &RequestItem) -> RepositoryResult<RequestItem> {
        let row = sqlx::query_as::<_, RequestItemRow>(&format!(
            r#"
            INSERT INTO request_items (user_id, item_name, quantity, reason, status, ga_note,
                                       created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()), COALESCE($8, NOW()))
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(item.user_id)
        .bind(&item.item_name)
        .bind(item.quantity)
        .bind(&item.reason)
        .bind(item.status.as_str())
        .bind(&item.ga_note)
        .bind(item.created_at)
        .bind(item.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find(&self, id: Id) -> RepositoryResult<Option<RequestItem>> {
        let row = sqlx::query_as::<_, RequestItemRow>(&format!(
            "SELECT {} FROM request_items WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(RequestItem::try_from).transpose()
    }

    async fn list(&self, requester: Option<Id>) -> RepositoryResult<Vec<RequestItem>> {
        let rows = sqlx::query_as::<_, RequestItemRow>(&format!(
            r#"
            SELECT {}
            FROM request_items
            WHERE ($1::BIGINT IS NULL OR user_id = $1)
            ORDER BY created_at DESC, id DESC
            "#,
            COLUMNS
        ))
        .bind(requester)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RequestItem::try_from).collect()
    }

    async fn update(&self, item: &RequestItem) -> RepositoryResult<RequestItem> {
        let id = persisted_id(item)?;
        let row = sqlx::query_as::<_, RequestItemRow>(&format!(
            r#"
            UPDATE request_items
            SET item_name = $2, quantity = $3, reason = $4, status = $5, ga_note = $6,
                updated_at = COALESCE($7, NOW())
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(id)
        .bind(&item.item_name)
        .bind(item.quantity)
        .bind(&item.reason)
        .bind(item.status.as_str())
        .bind(&item.ga_note)
        .bind(item.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found(RequestItem::TYPE_NAME, id))?;

        row.try_into()
    }
}

/// In-memory request item store
pub struct MemoryRequestItemStore {
    table: MemoryTable<RequestItem>,
}

impl Default for MemoryRequestItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRequestItemStore {
    pub fn new() -> Self {
        Self {
            table: MemoryTable::new(RequestItem::TYPE_NAME),
        }
    }
}

#[async_trait]
impl RequestItemStore for MemoryRequestItemStore {
    async fn insert(&self, item: &RequestItem) -> RepositoryResult<RequestItem> {
        Ok(self
            .table
            .insert(|id| RequestItem {
                id: Some(id),
                ..item.clone()
            })
            .await)
    }

    async fn find(&self, id: Id) -> RepositoryResult<Option<RequestItem>> {
        Ok(self.table.get(id).await)
    }

    async fn list(&self, requester: Option<Id>) -> RepositoryResult<Vec<RequestItem>> {
        let mut items: Vec<RequestItem> = self
            .table
            .all()
            .await
            .into_iter()
            .filter(|item| requester.map_or(true, |id| item.user_id == id))
            .collect();
        items.reverse();
        Ok(items)
    }

    async fn update(&self, item: &RequestItem) -> RepositoryResult<RequestItem> {
        self.table.replace(item.id, item.clone()).await
    }
}
