//! Core error types for OfficeOps RS
//!
//! Every service operation fails with an [`OoError`]. The variant decides the
//! HTTP status and whether the message may be shown to the caller.

use std::collections::HashMap;
use thiserror::Error;

/// Core error type for all OfficeOps operations
#[derive(Error, Debug)]
pub enum OoError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation failed: {}", .0.full_messages().join(", "))]
    Validation(#[from] ValidationErrors),

    /// Wrong source state for the requested action
    #[error("Invalid state transition: cannot {action} {entity} in status {from}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        action: String,
    },

    /// The record is not in a phase that accepts the requested action
    #[error("{entity} is not in {expected} phase (status {from})")]
    InvalidPhase {
        entity: &'static str,
        from: String,
        expected: String,
    },

    #[error("Storage error during {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl OoError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        OoError::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        OoError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        OoError::Forbidden {
            message: message.into(),
        }
    }

    /// Single-field validation failure
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        OoError::Validation(errors)
    }

    pub fn invalid_transition(
        entity: &'static str,
        from: impl std::fmt::Display,
        action: impl Into<String>,
    ) -> Self {
        OoError::InvalidTransition {
            entity,
            from: from.to_string(),
            action: action.into(),
        }
    }

    pub fn invalid_phase(
        entity: &'static str,
        from: impl std::fmt::Display,
        expected: impl Into<String>,
    ) -> Self {
        OoError::InvalidPhase {
            entity,
            from: from.to_string(),
            expected: expected.into(),
        }
    }

    pub fn storage(operation: &'static str, err: impl std::fmt::Display) -> Self {
        OoError::Storage {
            operation,
            message: err.to_string(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            OoError::NotFound { .. } => 404,
            OoError::Unauthorized { .. } => 401,
            OoError::Forbidden { .. } => 403,
            OoError::Validation(_)
            | OoError::InvalidTransition { .. }
            | OoError::InvalidPhase { .. } => 422,
            OoError::Storage { .. }
            | OoError::Database(_)
            | OoError::Internal(_)
            | OoError::Config(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            OoError::NotFound { .. } => "not_found",
            OoError::Unauthorized { .. } => "unauthorized",
            OoError::Forbidden { .. } => "forbidden",
            OoError::Validation(_) => "validation_failed",
            OoError::InvalidTransition { .. } => "invalid_transition",
            OoError::InvalidPhase { .. } => "invalid_phase",
            OoError::Storage { .. } => "internal_storage_error",
            OoError::Database(_) => "database_error",
            OoError::Internal(_) => "internal_error",
            OoError::Config(_) => "configuration_error",
        }
    }

    /// Whether the error is an unexpected fault rather than a caller mistake
    pub fn is_internal(&self) -> bool {
        self.status_code() >= 500
    }

    /// Message safe to return to the caller; internals are never leaked
    pub fn public_message(&self) -> String {
        if self.is_internal() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

/// Validation errors collection (field name -> messages)
#[derive(Error, Debug, Default, Clone)]
#[error("Validation errors: {errors:?}")]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: HashMap<String, Vec<String>>,
    /// Base errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Get errors for a specific field
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    /// Ok when empty, otherwise the collected errors
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Messages sorted by field so responses are stable
    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        let mut fields: Vec<_> = self.errors.keys().collect();
        fields.sort();
        for field in fields {
            for msg in &self.errors[field] {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }
}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(source: validator::ValidationErrors) -> Self {
        let mut errors = ValidationErrors::new();
        for (field, field_errors) in source.field_errors() {
            for err in field_errors {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("is invalid ({})", err.code));
                // Struct-level checks are reported under "__all__"
                if field == "__all__" {
                    errors.add(err.code.to_string(), message);
                } else {
                    errors.add(field, message);
                }
            }
        }
        errors
    }
}

impl From<validator::ValidationErrors> for OoError {
    fn from(source: validator::ValidationErrors) -> Self {
        OoError::Validation(source.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(OoError::not_found("Todo", 1).status_code(), 404);
        assert_eq!(OoError::invalid("evidence", "is required").status_code(), 422);
        assert_eq!(
            OoError::invalid_transition("todo", "completed", "start").status_code(),
            422
        );
        assert_eq!(OoError::storage("rename", "disk full").status_code(), 500);
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let err = OoError::storage("put", "/var/data/evidence: permission denied");
        assert!(err.is_internal());
        assert_eq!(err.public_message(), "Internal server error");

        let err = OoError::invalid_transition("todo", "checking", "start");
        assert_eq!(
            err.public_message(),
            "Invalid state transition: cannot start todo in status checking"
        );
    }

    #[test]
    fn test_full_messages_are_sorted() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "can't be blank");
        errors.add("evidence", "is required");
        errors.add_base("Request is malformed");

        assert_eq!(
            errors.full_messages(),
            vec![
                "Request is malformed".to_string(),
                "evidence is required".to_string(),
                "title can't be blank".to_string(),
            ]
        );
    }

    #[test]
    fn test_merge() {
        let mut a = ValidationErrors::new();
        a.add("title", "is too long");
        let mut b = ValidationErrors::new();
        b.add("title", "can't be blank");
        b.add("quantity", "must be at least 1");

        a.merge(b);
        assert_eq!(a.get("title").map(Vec::len), Some(2));
        assert!(a.has_error("quantity"));
    }
}
