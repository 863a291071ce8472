//! Meeting store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oo_core::{Entity, Id};
use oo_models::Meeting;
use sqlx::{FromRow, PgPool};

use crate::memory::MemoryTable;
use crate::repository::{parse_column, persisted_id, RepositoryError, RepositoryResult};

#[async_trait]
pub trait MeetingStore: Send + Sync {
    async fn insert(&self, meeting: &Meeting) -> RepositoryResult<Meeting>;

    async fn find(&self, id: Id) -> RepositoryResult<Option<Meeting>>;

    /// Newest first; `organizer` limits the list to one user
    async fn list(&self, organizer: Option<Id>) -> RepositoryResult<Vec<Meeting>>;

    async fn update(&self, meeting: &Meeting) -> RepositoryResult<Meeting>;
}

#[derive(Debug, Clone, FromRow)]
pub struct MeetingRow {
    pub id: i64,
    pub user_id: i64,
    pub room_name: String,
    pub agenda: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<MeetingRow> for Meeting {
    type Error = RepositoryError;

    fn try_from(row: MeetingRow) -> RepositoryResult<Self> {
        Ok(Meeting {
            id: Some(row.id),
            user_id: row.user_id,
            room_name: row.room_name,
            agenda: row.agenda,
            start_time: row.start_time,
            end_time: row.end_time,
            status: parse_column(Meeting::TYPE_NAME, &row.status)?,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

const COLUMNS: &str =
    "id, user_id, room_name, agenda, start_time, end_time, status, created_at, updated_at";

/// Postgres meeting store
pub struct PgMeetingStore {
    pool: PgPool,
}

impl PgMeetingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MeetingStore for PgMeetingStore {
    async fn insert(&self, meeting: &Meeting) -> RepositoryResult<Meeting> {
        let row = sqlx::query_as::<_, MeetingRow>(&format!(
            r#"
            INSERT INTO meetings (user_id, room_name, agenda, start_time, end_time, status,
                                  created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()), COALESCE($8, NOW()))
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(meeting.user_id)
        .bind(&meeting.room_name)
        .bind(&meeting.agenda)
        .bind(meeting.start_time)
        .bind(meeting.end_time)
        .bind(meeting.status.as_str())
        .bind(meeting.created_at)
        .bind(meeting.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find(&self, id: Id) -> RepositoryResult<Option<Meeting>> {
        let row = sqlx::query_as::<_, MeetingRow>(&format!(
            "SELECT {} FROM meetings WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Meeting::try_from).transpose()
    }

    async fn list(&self, organizer: Option<Id>) -> RepositoryResult<Vec<Meeting>> {
        let rows = sqlx::query_as::<_, MeetingRow>(&format!(
            r#"
            SELECT {}
            FROM meetings
            WHERE ($1::BIGINT IS NULL OR user_id = $1)
            ORDER BY created_at DESC, id DESC
            "#,
            COLUMNS
        ))
        .bind(organizer)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Meeting::try_from).collect()
    }

    async fn update(&self, meeting: &Meeting) -> RepositoryResult<Meeting> {
        let id = persisted_id(meeting)?;
        let row = sqlx::query_as::<_, MeetingRow>(&format!(
            r#"
            UPDATE meetings
            SET room_name = $2, agenda = $3, start_time = $4, end_time = $5, status = $6,
                updated_at = COALESCE($7, NOW())
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(id)
        .bind(&meeting.room_name)
        .bind(&meeting.agenda)
        .bind(meeting.start_time)
        .bind(meeting.end_time)
        .bind(meeting.status.as_str())
        .bind(meeting.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found(Meeting::TYPE_NAME, id))?;

        row.try_into()
    }
}

/// In-memory meeting store
pub struct MemoryMeetingStore {
    table: MemoryTable<Meeting>,
}

impl Default for MemoryMeetingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMeetingStore {
    pub fn new() -> Self {
        Self {
            table: MemoryTable::new(Meeting::TYPE_NAME),
        }
    }
}

#[async_trait]
impl MeetingStore for MemoryMeetingStore {
    async fn insert(&self, meeting: &Meeting) -> RepositoryResult<Meeting> {
        Ok(self
            .table
            .insert(|id| Meeting {
                id: Some(id),
                ..meeting.clone()
            })
            .await)
    }

    async fn find(&self, id: Id) -> RepositoryResult<Option<Meeting>> {
        Ok(self.table.get(id).await)
    }

    async fn list(&self, organizer: Option<Id>) -> RepositoryResult<Vec<Meeting>> {
        let mut rows: Vec<Meeting> = self
            .table
            .all()
            .await
            .into_iter()
            .filter(|m| organizer.map_or(true, |id| m.user_id == id))
            .collect();
        rows.reverse();
        Ok(rows)
    }

    async fn update(&self, meeting: &Meeting) -> RepositoryResult<Meeting> {
        self.table.replace(meeting.id, meeting.clone()).await
    }
}
