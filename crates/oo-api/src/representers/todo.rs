//! Todo representer

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use oo_core::Id;
use oo_evidence::EvidenceFile;
use oo_models::{Todo, TodoStatus, User};
use oo_services::todos::TodoWithOwner;
use serde::Serialize;

use crate::extractors::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct TodoResource {
    pub id: Option<Id>,
    pub user_id: Id,
    pub title: String,
    pub description: Option<String>,
    pub status: TodoStatus,
    pub daily_sequence: i32,
    /// Name of the first evidence file without extension
    pub evidence_name: Option<String>,
    pub evidence: Vec<EvidenceFile>,
    pub checked_by: Option<Id>,
    pub checker_display: Option<String>,
    pub notes: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub scheduled_date: Option<NaiveDate>,
    pub started_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub total_work_time: Option<i64>,
    pub work_duration: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub formatted_created_at: Option<String>,
    pub formatted_updated_at: Option<String>,
    pub formatted_started_at: Option<String>,
    pub formatted_submitted_at: Option<String>,
    pub formatted_due_date: Option<String>,
    pub day_of_due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

pub struct TodoRepresenter;

impl TodoRepresenter {
    pub async fn represent(state: &AppState, todo: Todo) -> TodoResource {
        Self::build(state, todo, None).await
    }

    /// Evaluator listings embed the owner
    pub async fn represent_with_owner(state: &AppState, item: TodoWithOwner) -> TodoResource {
        Self::build(state, item.todo, item.owner).await
    }

    pub async fn represent_all(state: &AppState, todos: Vec<Todo>) -> Vec<TodoResource> {
        let mut resources = Vec::with_capacity(todos.len());
        for todo in todos {
            resources.push(Self::represent(state, todo).await);
        }
        resources
    }

    async fn build(state: &AppState, todo: Todo, user: Option<User>) -> TodoResource {
        let ctx = &state.services;
        let display = &state.display;
        let evidence = ctx.evidence.describe_all(&todo.evidence_paths).await;
        let fmt = |at: Option<DateTime<Utc>>| at.map(|at| display.datetime(&ctx.region, at));

        TodoResource {
            id: todo.id,
            user_id: todo.user_id,
            evidence_name: evidence.first().map(|file| file.name.clone()),
            evidence,
            formatted_created_at: fmt(todo.created_at),
            formatted_updated_at: fmt(todo.updated_at),
            formatted_started_at: fmt(todo.started_at),
            formatted_submitted_at: fmt(todo.submitted_at),
            formatted_due_date: todo.due_date.map(|date| display.date(date)),
            day_of_due_date: todo
                .due_date
                .map(|date| ctx.locale.weekday_name(date.weekday()).to_string()),
            title: todo.title,
            description: todo.description,
            status: todo.status,
            daily_sequence: todo.daily_sequence,
            checked_by: todo.checked_by,
            checker_display: todo.checker_display,
            notes: todo.notes,
            due_date: todo.due_date,
            scheduled_date: todo.scheduled_date,
            started_at: todo.started_at,
            submitted_at: todo.submitted_at,
            total_work_time: todo.total_work_time,
            work_duration: todo.work_duration,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
            user,
        }
    }
}
