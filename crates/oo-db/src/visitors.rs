//! Visitor store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oo_core::pagination::{Page, PaginationParams};
use oo_core::{Entity, Id};
use oo_models::Visitor;
use sqlx::{FromRow, PgPool};

use crate::memory::MemoryTable;
use crate::repository::{parse_column, persisted_id, RepositoryError, RepositoryResult};

/// Visitor listing filter
#[derive(Debug, Clone, Default)]
pub struct VisitorQuery {
    /// Visit time in `[start, end)`
    pub window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Case-insensitive match on name or meet-with
    pub search: Option<String>,
}

impl VisitorQuery {
    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, visitor: &Visitor) -> bool {
        let in_window = self
            .window
            .map_or(true, |(start, end)| visitor.visit_time >= start && visitor.visit_time < end);
        let found = self.search_term().map_or(true, |term| {
            visitor.name.to_lowercase().contains(&term)
                || visitor.meet_with.to_lowercase().contains(&term)
        });
        in_window && found
    }
}

#[async_trait]
pub trait VisitorStore: Send + Sync {
    async fn insert(&self, visitor: &Visitor) -> RepositoryResult<Visitor>;

    async fn find(&self, id: Id) -> RepositoryResult<Option<Visitor>>;

    /// Latest visit first
    async fn list(
        &self,
        query: &VisitorQuery,
        pagination: PaginationParams,
    ) -> RepositoryResult<Page<Visitor>>;

    async fn update(&self, visitor: &Visitor) -> RepositoryResult<Visitor>;

    /// Removes the registrations of `name` visiting in `[start, end)`
    async fn delete_named_between(
        &self,
        name: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<Visitor>>;
}

#[derive(Debug, Clone, FromRow)]
pub struct VisitorRow {
    pub id: i64,
    pub name: String,
    pub meet_with: String,
    pub purpose: String,
    pub origin: Option<String>,
    pub visit_time: DateTime<Utc>,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub ktp_image_path: String,
    pub ktp_ocr: Option<String>,
    pub face_image_path: String,
    pub face_verified: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<VisitorRow> for Visitor {
    type Error = RepositoryError;

    fn try_from(row: VisitorRow) -> RepositoryResult<Self> {
        Ok(Visitor {
            id: Some(row.id),
            name: row.name,
            meet_with: row.meet_with,
            purpose: row.purpose,
            origin: row.origin,
            visit_time: row.visit_time,
            check_in: row.check_in,
            check_out: row.check_out,
            ktp_image_path: row.ktp_image_path,
            ktp_ocr: row.ktp_ocr,
            face_image_path: row.face_image_path,
            face_verified: row.face_verified,
            status: parse_column(Visitor::TYPE_NAME, &row.status)?,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

const COLUMNS: &str = "id, name, meet_with, purpose, origin, visit_time, check_in, check_out, \
                       ktp_image_path, ktp_ocr, face_image_path, face_verified, status, \
                       created_at, updated_at";

/// Shared WHERE clause for listing and counting
const LIST_FILTER: &str = r#"
    WHERE ($1::TIMESTAMPTZ IS NULL OR visit_time >= $1)
      AND ($2::TIMESTAMPTZ IS NULL OR visit_time < $2)
      AND ($3::TEXT IS NULL OR LOWER(name) LIKE $3 OR LOWER(meet_with) LIKE $3)
"#;

/// Postgres visitor store
pub struct PgVisitorStore {
    pool: PgPool,
}

impl PgVisitorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitorStore for PgVisitorStore {
    async fn insert(&self, visitor: &Visitor) -> RepositoryResult<Visitor> {
        let row = sqlx::query_as::<_, VisitorRow>(&format!(
            r#"
            INSERT INTO visitors (name, meet_with, purpose, origin, visit_time, check_in, check_out,
                                  ktp_image_path, ktp_ocr, face_image_path, face_verified, status,
                                  created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    COALESCE($13, NOW()), COALESCE($14, NOW()))
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(&visitor.name)
        .bind(&visitor.meet_with)
        .bind(&visitor.purpose)
        .bind(&visitor.origin)
        .bind(visitor.visit_time)
        .bind(visitor.check_in)
        .bind(visitor.check_out)
        .bind(&visitor.ktp_image_path)
        .bind(&visitor.ktp_ocr)
        .bind(&visitor.face_image_path)
        .bind(visitor.face_verified)
        .bind(visitor.status.as_str())
        .bind(visitor.created_at)
        .bind(visitor.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find(&self, id: Id) -> RepositoryResult<Option<Visitor>> {
        let row = sqlx::query_as::<_, VisitorRow>(&format!(
            "SELECT {} FROM visitors WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Visitor::try_from).transpose()
    }

    async fn list(
        &self,
        query: &VisitorQuery,
        pagination: PaginationParams,
    ) -> RepositoryResult<Page<Visitor>> {
        let pagination = pagination.normalized();
        let start = query.window.map(|(start, _)| start);
        let end = query.window.map(|(_, end)| end);
        let pattern = query.search_term().map(|term| format!("%{}%", term));

        let rows = sqlx::query_as::<_, VisitorRow>(&format!(
            "SELECT {} FROM visitors {} ORDER BY visit_time DESC, id DESC LIMIT $4 OFFSET $5",
            COLUMNS, LIST_FILTER
        ))
        .bind(start)
        .bind(end)
        .bind(&pattern)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM visitors {}",
            LIST_FILTER
        ))
        .bind(start)
        .bind(end)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let visitors = rows
            .into_iter()
            .map(Visitor::try_from)
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok(Page::new(visitors, total, &pagination))
    }

    async fn update(&self, visitor: &Visitor) -> RepositoryResult<Visitor> {
        let id = persisted_id(visitor)?;
        let row = sqlx::query_as::<_, VisitorRow>(&format!(
            r#"
            UPDATE visitors
            SET check_in = $2, check_out = $3, ktp_ocr = $4, face_verified = $5, status = $6,
                updated_at = COALESCE($7, NOW())
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(id)
        .bind(visitor.check_in)
        .bind(visitor.check_out)
        .bind(&visitor.ktp_ocr)
        .bind(visitor.face_verified)
        .bind(visitor.status.as_str())
        .bind(visitor.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found(Visitor::TYPE_NAME, id))?;

        row.try_into()
    }

    async fn delete_named_between(
        &self,
        name: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<Visitor>> {
        let rows = sqlx::query_as::<_, VisitorRow>(&format!(
            r#"
            DELETE FROM visitors
            WHERE name = $1 AND visit_time >= $2 AND visit_time < $3
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(name)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Visitor::try_from).collect()
    }
}

/// In-memory visitor store
pub struct MemoryVisitorStore {
    table: MemoryTable<Visitor>,
}

impl Default for MemoryVisitorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryVisitorStore {
    pub fn new() -> Self {
        Self {
            table: MemoryTable::new(Visitor::TYPE_NAME),
        }
    }
}

#[async_trait]
impl VisitorStore for MemoryVisitorStore {
    async fn insert(&self, visitor: &Visitor) -> RepositoryResult<Visitor> {
        Ok(self
            .table
            .insert(|id| Visitor {
                id: Some(id),
                ..visitor.clone()
            })
            .await)
    }

    async fn find(&self, id: Id) -> RepositoryResult<Option<Visitor>> {
        Ok(self.table.get(id).await)
    }

    async fn list(
        &self,
        query: &VisitorQuery,
        pagination: PaginationParams,
    ) -> RepositoryResult<Page<Visitor>> {
        let mut rows: Vec<Visitor> = self
            .table
            .all()
            .await
            .into_iter()
            .filter(|v| query.matches(v))
            .collect();
        rows.sort_by(|a, b| b.visit_time.cmp(&a.visit_time).then(b.id.cmp(&a.id)));
        Ok(pagination.normalized().paginate(rows))
    }

    async fn update(&self, visitor: &Visitor) -> RepositoryResult<Visitor> {
        self.table.replace(visitor.id, visitor.clone()).await
    }

    async fn delete_named_between(
        &self,
        name: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<Visitor>> {
        Ok(self
            .table
            .remove_where(|v| v.name == name && v.visit_time >= start && v.visit_time < end)
            .await)
    }
}
