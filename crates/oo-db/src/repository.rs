//! Repository error handling
//!
//! Shared by every store, Postgres-backed or in-memory.

use oo_core::{Entity, Id, OoError};

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {entity} #{id}")]
    NotFound { entity: &'static str, id: Id },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value no longer maps onto the domain type
    #[error("Corrupt {entity} row: {message}")]
    Corrupt {
        entity: &'static str,
        message: String,
    },

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: Id) -> Self {
        RepositoryError::NotFound { entity, id }
    }

    pub fn corrupt(entity: &'static str, message: impl Into<String>) -> Self {
        RepositoryError::Corrupt {
            entity,
            message: message.into(),
        }
    }

    /// Record without an id cannot be updated
    pub fn unsaved(entity: &'static str) -> Self {
        RepositoryError::Conflict(format!("{} has not been persisted", entity))
    }
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<RepositoryError> for OoError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => OoError::not_found(entity, id),
            other => OoError::Database(other.to_string()),
        }
    }
}

/// Id of a record about to be updated
pub(crate) fn persisted_id<E: Entity>(record: &E) -> RepositoryResult<Id> {
    record.id().ok_or_else(|| RepositoryError::unsaved(E::TYPE_NAME))
}

/// Parses a TEXT status column into its enum
pub(crate) fn parse_column<T>(entity: &'static str, value: &str) -> RepositoryResult<T>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse().map_err(|e| RepositoryError::corrupt(entity, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oo_models::TodoStatus;

    #[test]
    fn test_not_found_maps_to_404() {
        let err: OoError = RepositoryError::not_found("Todo", 3).into();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_other_errors_are_internal() {
        let err: OoError = RepositoryError::Conflict("duplicate".into()).into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "database_error");
    }

    #[test]
    fn test_parse_column() {
        let status: TodoStatus = parse_column("Todo", "in_progress").unwrap();
        assert_eq!(status, TodoStatus::InProgress);
        assert!(parse_column::<TodoStatus>("Todo", "archived").is_err());
    }
}
