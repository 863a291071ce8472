//! TodoWarning model
//!
//! Table: todo_warnings
//!
//! A penalty attached to a todo when an evaluator approves it. Warnings are
//! never edited and disappear together with their todo.

use chrono::{DateTime, Utc};
use oo_core::traits::{Entity, Id, Identifiable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::todo::Todo;

/// Upper bound for warning points
pub const MAX_WARNING_POINTS: i32 = 300;

/// Severity band derived from points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningLevel {
    Low,
    Medium,
    High,
}

impl WarningLevel {
    /// 1-35 low, 36-65 medium, 66 and above high; zero means no warning
    pub fn from_points(points: i32) -> Option<WarningLevel> {
        match points {
            p if p <= 0 => None,
            1..=35 => Some(WarningLevel::Low),
            36..=65 => Some(WarningLevel::Medium),
            _ => Some(WarningLevel::High),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WarningLevel::Low => "low",
            WarningLevel::Medium => "medium",
            WarningLevel::High => "high",
        }
    }
}

impl fmt::Display for WarningLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WarningLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(WarningLevel::Low),
            "medium" => Ok(WarningLevel::Medium),
            "high" => Ok(WarningLevel::High),
            other => Err(format!("unknown warning level: {}", other)),
        }
    }
}

/// Warning entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoWarning {
    pub id: Option<Id>,
    pub todo_id: Id,
    /// Owner of the todo, kept here for per-user aggregation
    pub user_id: Id,
    pub evaluator_id: Id,
    pub points: i32,
    pub level: WarningLevel,
    pub note: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Identifiable for TodoWarning {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for TodoWarning {
    const TYPE_NAME: &'static str = "TodoWarning";
}

impl TodoWarning {
    /// The warning an approval with `points` produces, if any
    pub fn issue(
        todo: &Todo,
        evaluator_id: Id,
        points: i32,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Option<TodoWarning> {
        let level = WarningLevel::from_points(points)?;
        Some(TodoWarning {
            id: None,
            todo_id: todo.id.unwrap_or_default(),
            user_id: todo.user_id,
            evaluator_id,
            points,
            level,
            note,
            created_at: Some(now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_breakpoints() {
        assert_eq!(WarningLevel::from_points(0), None);
        assert_eq!(WarningLevel::from_points(1), Some(WarningLevel::Low));
        assert_eq!(WarningLevel::from_points(35), Some(WarningLevel::Low));
        assert_eq!(WarningLevel::from_points(36), Some(WarningLevel::Medium));
        assert_eq!(WarningLevel::from_points(65), Some(WarningLevel::Medium));
        assert_eq!(WarningLevel::from_points(66), Some(WarningLevel::High));
        assert_eq!(WarningLevel::from_points(300), Some(WarningLevel::High));
    }

    #[test]
    fn test_zero_points_issue_nothing() {
        let todo = Todo {
            id: Some(3),
            user_id: 7,
            ..Todo::default()
        };
        assert!(TodoWarning::issue(&todo, 2, 0, None, Utc::now()).is_none());

        let warning = TodoWarning::issue(&todo, 2, 50, Some("late".into()), Utc::now()).unwrap();
        assert_eq!(warning.level, WarningLevel::Medium);
        assert_eq!(warning.user_id, 7);
        assert_eq!(warning.todo_id, 3);
    }
}
