//! Asset store

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use oo_core::{Entity, Id};
use oo_models::Asset;
use sqlx::{FromRow, PgPool};

use crate::memory::MemoryTable;
use crate::repository::{parse_column, persisted_id, RepositoryError, RepositoryResult};

#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn insert(&self, asset: &Asset) -> RepositoryResult<Asset>;

    async fn find(&self, id: Id) -> RepositoryResult<Option<Asset>>;

    /// Newest first
    async fn list(&self) -> RepositoryResult<Vec<Asset>>;

    async fn update(&self, asset: &Asset) -> RepositoryResult<Asset>;
}

#[derive(Debug, Clone, FromRow)]
pub struct AssetRow {
    pub id: i64,
    pub request_item_id: i64,
    pub procurement_id: Option<i64>,
    pub asset_code: String,
    pub category: String,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub received_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AssetRow> for Asset {
    type Error = RepositoryError;

    fn try_from(row: AssetRow) -> RepositoryResult<Self> {
        Ok(Asset {
            id: Some(row.id),
            request_item_id: row.request_item_id,
            procurement_id: row.procurement_id,
            asset_code: row.asset_code,
            category: row.category,
            location: row.location,
            notes: row.notes,
            status: parse_column(Asset::TYPE_NAME, &row.status)?,
            received_date: row.received_date,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

const COLUMNS: &str = "id, request_item_id, procurement_id, asset_code, category, location, \
                       notes, status, received_date, created_at, updated_at";

/// Postgres asset store
pub struct PgAssetStore {
    pool: PgPool,
}

impl PgAssetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssetStore for PgAssetStore {
    async fn insert(&self, asset: &Asset) -> RepositoryResult<Asset> {
        let row = sqlx::query_as::<_, AssetRow>(&format!(
            r#"
            INSERT INTO assets (request_item_id, procurement_id, asset_code, category, location,
                                notes, status, received_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, NOW()), COALESCE($10, NOW()))
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(asset.request_item_id)
        .bind(asset.procurement_id)
        .bind(&asset.asset_code)
        .bind(&asset.category)
        .bind(&asset.location)
        .bind(&asset.notes)
        .bind(asset.status.as_str())
        .bind(asset.received_date)
        .bind(asset.created_at)
        .bind(asset.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(format!("asset code {} is taken", asset.asset_code))
            }
            _ => RepositoryError::Database(e),
        })?;

        row.try_into()
    }

    async fn find(&self, id: Id) -> RepositoryResult<Option<Asset>> {
        let row = sqlx::query_as::<_, AssetRow>(&format!(
            "SELECT {} FROM assets WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Asset::try_from).transpose()
    }

    async fn list(&self) -> RepositoryResult<Vec<Asset>> {
        let rows = sqlx::query_as::<_, AssetRow>(&format!(
            "SELECT {} FROM assets ORDER BY created_at DESC, id DESC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Asset::try_from).collect()
    }

    async fn update(&self, asset: &Asset) -> RepositoryResult<Asset> {
        let id = persisted_id(asset)?;
        let row = sqlx::query_as::<_, AssetRow>(&format!(
            r#"
            UPDATE assets
            SET procurement_id = $2, category = $3, location = $4, notes = $5, status = $6,
                received_date = $7, updated_at = COALESCE($8, NOW())
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(id)
        .bind(asset.procurement_id)
        .bind(&asset.category)
        .bind(&asset.location)
        .bind(&asset.notes)
        .bind(asset.status.as_str())
        .bind(asset.received_date)
        .bind(asset.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found(Asset::TYPE_NAME, id))?;

        row.try_into()
    }
}

/// In-memory asset store
pub struct MemoryAssetStore {
    table: MemoryTable<Asset>,
}

impl Default for MemoryAssetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self {
            table: MemoryTable::new(Asset::TYPE_NAME),
        }
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn insert(&self, asset: &Asset) -> RepositoryResult<Asset> {
        Ok(self
            .table
            .insert(|id| Asset {
                id: Some(id),
                ..asset.clone()
            })
            .await)
    }

    async fn find(&self, id: Id) -> RepositoryResult<Option<Asset>> {
        Ok(self.table.get(id).await)
    }

    async fn list(&self) -> RepositoryResult<Vec<Asset>> {
        let mut rows = self.table.all().await;
        rows.reverse();
        Ok(rows)
    }

    async fn update(&self, asset: &Asset) -> RepositoryResult<Asset> {
        self.table.replace(asset.id, asset.clone()).await
    }
}
