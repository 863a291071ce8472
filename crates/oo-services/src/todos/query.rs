//! Todo listings and statistics

use std::collections::HashMap;

use oo_contracts::{require_evaluator, UserContext};
use oo_core::{Id, OoError, OoResult};
use oo_db::TodoFilter;
use oo_models::{Todo, TodoStatus, TodoWarning, User};
use serde::Serialize;
use tracing::instrument;

use super::find_todo;
use crate::context::ServiceContext;

/// A todo with its owner embedded, for evaluator listings
#[derive(Debug, Clone)]
pub struct TodoWithOwner {
    pub todo: Todo,
    pub owner: Option<User>,
}

/// Per-status counts of one user's todos
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStats {
    pub user_id: Id,
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub checking: usize,
    pub not_started: usize,
    pub evaluating: usize,
    pub reworked: usize,
    /// Percentage of completed todos, two decimals
    pub completion_rate: f64,
}

impl OverallStats {
    pub fn from_todos(user_id: Id, todos: &[Todo]) -> Self {
        let count = |status: TodoStatus| todos.iter().filter(|t| t.status == status).count();
        let total = todos.len();
        let completed = count(TodoStatus::Completed);
        let completion_rate = if total == 0 {
            0.0
        } else {
            (completed as f64 * 10_000.0 / total as f64).round() / 100.0
        };

        Self {
            user_id,
            total,
            completed,
            in_progress: count(TodoStatus::InProgress),
            checking: count(TodoStatus::Checking),
            not_started: count(TodoStatus::NotStarted),
            evaluating: count(TodoStatus::Evaluating),
            reworked: count(TodoStatus::Reworked),
            completion_rate,
        }
    }
}

pub struct TodoQueryService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> TodoQueryService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    /// The acting user's todos, newest first
    pub async fn list_own(&self, status: Option<TodoStatus>) -> OoResult<Vec<Todo>> {
        let filter = TodoFilter {
            user_id: Some(self.user.id()),
            status,
        };
        Ok(self.ctx.stores.todos.list(filter).await?)
    }

    /// Every todo with its owner; evaluators only
    #[instrument(skip_all, fields(evaluator_id = self.user.id()))]
    pub async fn list_all(&self, filter: TodoFilter) -> OoResult<Vec<TodoWithOwner>> {
        require_evaluator(self.user, "list all todos")?;
        let todos = self.ctx.stores.todos.list(filter).await?;

        let mut owner_ids: Vec<Id> = todos.iter().map(|t| t.user_id).collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();
        let owners: HashMap<Id, User> = self
            .ctx
            .stores
            .users
            .find_many(&owner_ids)
            .await?
            .into_iter()
            .filter_map(|user| user.id.map(|id| (id, user)))
            .collect();

        Ok(todos
            .into_iter()
            .map(|todo| TodoWithOwner {
                owner: owners.get(&todo.user_id).cloned(),
                todo,
            })
            .collect())
    }

    /// Warnings of one todo, visible to its owner and to evaluators
    pub async fn list_warnings(&self, todo_id: Id) -> OoResult<Vec<TodoWarning>> {
        let todo = find_todo(self.ctx, todo_id).await?;
        if !todo.is_owned_by(self.user.id()) && !self.user.is_evaluator() {
            return Err(OoError::not_found("Todo", todo_id));
        }
        Ok(self.ctx.stores.warnings.list_for_todo(todo_id).await?)
    }

    #[instrument(skip_all, fields(evaluator_id = self.user.id(), user_id = user_id))]
    pub async fn overall_stats(&self, user_id: Id) -> OoResult<OverallStats> {
        require_evaluator(self.user, "view todo statistics")?;
        if self.ctx.stores.users.find(user_id).await?.is_none() {
            return Err(OoError::not_found("User", user_id));
        }

        let todos = self
            .ctx
            .stores
            .todos
            .list(TodoFilter::for_user(user_id))
            .await?;
        Ok(OverallStats::from_todos(user_id, &todos))
    }
}
