//! Procurement store

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use oo_models::Procurement;
use sqlx::{FromRow, PgPool};

use crate::memory::MemoryTable;
use crate::repository::RepositoryResult;

#[async_trait]
pub trait ProcurementStore: Send + Sync {
    async fn insert(&self, procurement: &Procurement) -> RepositoryResult<Procurement>;

    /// Newest first
    async fn list(&self) -> RepositoryResult<Vec<Procurement>>;
}

#[derive(Debug, Clone, FromRow)]
pub struct ProcurementRow {
    pub id: i64,
    pub request_item_id: i64,
    pub executed_by: i64,
    pub purchase_date: NaiveDate,
    pub amount: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProcurementRow> for Procurement {
    fn from(row: ProcurementRow) -> Self {
        Procurement {
            id: Some(row.id),
            request_item_id: row.request_item_id,
            executed_by: row.executed_by,
            purchase_date: row.purchase_date,
            amount: row.amount,
            notes: row.notes,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

/// Postgres procurement store
pub struct PgProcurementStore {
    pool: PgPool,
}

impl PgProcurementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcurementStore for PgProcurementStore {
    async fn insert(&self, procurement: &Procurement) -> RepositoryResult<Procurement> {
        let row = sqlx::query_as::<_, ProcurementRow>(
            r#"
            INSERT INTO procurements (request_item_id, executed_by, purchase_date, amount, notes,
                                      created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()), COALESCE($7, NOW()))
            RETURNING id, request_item_id, executed_by, purchase_date, amount, notes,
                      created_at, updated_at
            "#,
        )
        .bind(procurement.request_item_id)
        .bind(procurement.executed_by)
        .bind(procurement.purchase_date)
        .bind(procurement.amount)
        .bind(&procurement.notes)
        .bind(procurement.created_at)
        .bind(procurement.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list(&self) -> RepositoryResult<Vec<Procurement>> {
        let rows = sqlx::query_as::<_, ProcurementRow>(
            r#"
            SELECT id, request_item_id, executed_by, purchase_date, amount, notes,
                   created_at, updated_at
            FROM procurements
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Procurement::from).collect())
    }
}

/// In-memory procurement store
pub struct MemoryProcurementStore {
    table: MemoryTable<Procurement>,
}

impl Default for MemoryProcurementStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProcurementStore {
    pub fn new() -> Self {
        Self {
            table: MemoryTable::new("Procurement"),
        }
    }
}

#[async_trait]
impl ProcurementStore for MemoryProcurementStore {
    async fn insert(&self, procurement: &Procurement) -> RepositoryResult<Procurement> {
        Ok(self
            .table
            .insert(|id| Procurement {
                id: Some(id),
                ..procurement.clone()
            })
            .await)
    }

    async fn list(&self) -> RepositoryResult<Vec<Procurement>> {
        let mut rows = self.table.all().await;
        rows.reverse();
        Ok(rows)
    }
}
