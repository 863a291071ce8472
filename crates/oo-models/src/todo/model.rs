//! Todo entity
//!
//! Table: todos

use chrono::{DateTime, NaiveDate, Utc};
use oo_core::traits::{Entity, Id, Identifiable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Workflow status of a todo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    #[default]
    NotStarted,
    InProgress,
    /// Evidence submitted, waiting for an evaluator
    Checking,
    /// Sent back by an evaluator, waiting for the owner
    Evaluating,
    /// Owner submitted an improvement, waiting for an evaluator
    Reworked,
    Completed,
}

impl TodoStatus {
    pub const ALL: [TodoStatus; 6] = [
        TodoStatus::NotStarted,
        TodoStatus::InProgress,
        TodoStatus::Checking,
        TodoStatus::Evaluating,
        TodoStatus::Reworked,
        TodoStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::NotStarted => "not_started",
            TodoStatus::InProgress => "in_progress",
            TodoStatus::Checking => "checking",
            TodoStatus::Evaluating => "evaluating",
            TodoStatus::Reworked => "reworked",
            TodoStatus::Completed => "completed",
        }
    }

    /// Statuses in which evidence files are attached
    pub fn holds_evidence(&self) -> bool {
        matches!(
            self,
            TodoStatus::Checking
                | TodoStatus::Evaluating
                | TodoStatus::Reworked
                | TodoStatus::Completed
        )
    }

    /// Statuses an evaluator may act on
    pub fn is_evaluable(&self) -> bool {
        matches!(self, TodoStatus::Checking | TodoStatus::Reworked)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TodoStatus::Completed)
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TodoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TodoStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown todo status: {}", s))
    }
}

/// Todo entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Todo {
    pub id: Option<Id>,

    /// Owning user
    pub user_id: Id,

    #[validate(length(min = 1, max = 150))]
    pub title: String,

    pub description: Option<String>,

    pub due_date: Option<NaiveDate>,

    pub scheduled_date: Option<NaiveDate>,

    #[serde(default)]
    pub status: TodoStatus,

    /// 1-based ordinal among the owner's todos created the same regional day
    pub daily_sequence: i32,

    pub started_at: Option<DateTime<Utc>>,

    pub submitted_at: Option<DateTime<Utc>>,

    /// Minutes between start and submission
    pub total_work_time: Option<i64>,

    /// Human-readable form of `total_work_time`
    pub work_duration: Option<String>,

    /// Storage paths of the attached evidence, in submission order
    #[serde(default)]
    pub evidence_paths: Vec<String>,

    /// Evaluator who last acted on the todo
    pub checked_by: Option<Id>,

    /// e.g. "Dina (GA)"
    pub checker_display: Option<String>,

    pub notes: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Todo {
    fn default() -> Self {
        Self {
            id: None,
            user_id: 0,
            title: String::new(),
            description: None,
            due_date: None,
            scheduled_date: None,
            status: TodoStatus::NotStarted,
            daily_sequence: 1,
            started_at: None,
            submitted_at: None,
            total_work_time: None,
            work_duration: None,
            evidence_paths: Vec::new(),
            checked_by: None,
            checker_display: None,
            notes: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Identifiable for Todo {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for Todo {
    const TYPE_NAME: &'static str = "Todo";
}

impl Todo {
    pub fn is_owned_by(&self, user_id: Id) -> bool {
        self.user_id == user_id
    }

    pub fn has_evidence(&self) -> bool {
        !self.evidence_paths.is_empty()
    }
}

/// Input for creating a todo
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewTodo {
    #[validate(length(min = 1, max = 150, message = "must be between 1 and 150 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub scheduled_date: Option<NaiveDate>,
}

/// Text edits allowed before checking
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTodo {
    #[validate(length(min = 1, max = 150, message = "must be between 1 and 150 characters"))]
    pub title: Option<String>,
    /// `Some("")` clears the description
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub scheduled_date: Option<NaiveDate>,
}

impl UpdateTodo {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.scheduled_date.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in TodoStatus::ALL {
            assert_eq!(status.as_str().parse::<TodoStatus>(), Ok(status));
        }
        assert!("done".parse::<TodoStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&TodoStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not_started\"");
    }

    #[test]
    fn test_evidence_holding_statuses() {
        assert!(!TodoStatus::NotStarted.holds_evidence());
        assert!(!TodoStatus::InProgress.holds_evidence());
        assert!(TodoStatus::Checking.holds_evidence());
        assert!(TodoStatus::Completed.holds_evidence());
    }

    #[test]
    fn test_title_length_validation() {
        let input = NewTodo {
            title: "x".repeat(151),
            ..Default::default()
        };
        assert!(input.validate().is_err());

        let input = NewTodo {
            title: "Write report".into(),
            ..Default::default()
        };
        assert!(input.validate().is_ok());
    }
}
