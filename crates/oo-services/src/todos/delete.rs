//! Delete a todo
//!
//! Evidence files are kept on disk, renamed with the `Deleted` stage, so
//! the record of the work survives the todo. The files are renamed before
//! the record goes and moved back if the delete fails.

use oo_contracts::UserContext;
use oo_core::{Id, OoResult};
use oo_evidence::Stage;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use super::find_owned_todo;
use crate::context::ServiceContext;

#[derive(Debug, Clone, Serialize)]
pub struct DeletedTodo {
    pub id: Id,
    /// Where the evidence files ended up
    pub retained_evidence: Vec<String>,
}

pub struct DeleteTodoService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> DeleteTodoService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    #[instrument(skip_all, fields(user_id = self.user.id(), todo_id = id))]
    pub async fn call(self, id: Id) -> OoResult<DeletedTodo> {
        let todo = find_owned_todo(self.ctx, self.user, id).await?;

        let retained = self
            .ctx
            .evidence
            .restage_all(&todo.evidence_paths, Stage::Deleted)
            .await;
        if let Err(err) = self.ctx.stores.todos.delete(id).await {
            error!(error = %err, "Failed to delete todo");
            self.ctx.evidence.revert(&todo.evidence_paths, &retained).await;
            return Err(err.into());
        }

        // Postgres cascades; the in-memory store needs the explicit sweep
        let warnings = match self.ctx.stores.warnings.delete_for_todo(id).await {
            Ok(removed) => removed,
            Err(err) => {
                warn!(error = %err, "Failed to delete warnings of deleted todo");
                0
            }
        };

        info!(warnings_removed = warnings, files = retained.len(), "Todo deleted");
        Ok(DeletedTodo {
            id,
            retained_evidence: retained,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{checking_todo, harness, started_todo, GA, OWNER, STRANGER};
    use crate::todos::EvaluateTodoService;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use oo_contracts::EvaluateTodo;
    use oo_db::{RepositoryError, RepositoryResult, TodoFilter, TodoStore};
    use oo_models::Todo;
    use std::sync::Arc;

    /// Passes everything through except deletes
    struct UndeletableTodos(Arc<dyn TodoStore>);

    #[async_trait]
    impl TodoStore for UndeletableTodos {
        async fn insert(&self, todo: &Todo) -> RepositoryResult<Todo> {
            self.0.insert(todo).await
        }
        async fn find(&self, id: Id) -> RepositoryResult<Option<Todo>> {
            self.0.find(id).await
        }
        async fn list(&self, filter: TodoFilter) -> RepositoryResult<Vec<Todo>> {
            self.0.list(filter).await
        }
        async fn update(&self, todo: &Todo) -> RepositoryResult<Todo> {
            self.0.update(todo).await
        }
        async fn delete(&self, _id: Id) -> RepositoryResult<()> {
            Err(RepositoryError::Conflict("todos table is locked".into()))
        }
        async fn max_daily_sequence(
            &self,
            user_id: Id,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> RepositoryResult<i32> {
            self.0.max_daily_sequence(user_id, start, end).await
        }
    }

    #[tokio::test]
    async fn test_delete_keeps_renamed_evidence() {
        let h = harness().await;
        let todo = checking_todo(&h, 2).await;
        let id = todo.id.unwrap();
        EvaluateTodoService::new(&h.ctx, &GA)
            .call(id, EvaluateTodo::approve().with_warning_points(10))
            .await
            .unwrap();

        let deleted = DeleteTodoService::new(&h.ctx, &OWNER).call(id).await.unwrap();

        assert_eq!(deleted.retained_evidence.len(), 2);
        assert!(deleted
            .retained_evidence
            .iter()
            .all(|p| p.ends_with("-Deleted.png") && !p.contains("Approved")));
        assert_eq!(h.storage.paths().await, deleted.retained_evidence);
        assert!(h.ctx.stores.todos.find(id).await.unwrap().is_none());
        assert!(h.ctx.stores.warnings.list_for_todo(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_without_evidence() {
        let h = harness().await;
        let id = started_todo(&h).await;

        let deleted = DeleteTodoService::new(&h.ctx, &OWNER).call(id).await.unwrap();
        assert!(deleted.retained_evidence.is_empty());
    }

    #[tokio::test]
    async fn test_only_owner_deletes() {
        let h = harness().await;
        let id = started_todo(&h).await;

        let err = DeleteTodoService::new(&h.ctx, &STRANGER).call(id).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert!(h.ctx.stores.todos.find(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_delete_restores_evidence_and_warnings() {
        let mut h = harness().await;
        let todo = checking_todo(&h, 2).await;
        let id = todo.id.unwrap();
        let approved = EvaluateTodoService::new(&h.ctx, &GA)
            .call(id, EvaluateTodo::approve().with_warning_points(10))
            .await
            .unwrap();
        h.ctx.stores.todos = Arc::new(UndeletableTodos(h.ctx.stores.todos.clone()));

        let err = DeleteTodoService::new(&h.ctx, &OWNER).call(id).await.unwrap_err();
        assert_eq!(err.status_code(), 500);

        let kept = h.ctx.stores.todos.find(id).await.unwrap().unwrap();
        assert_eq!(kept.evidence_paths, approved.todo.evidence_paths);
        let mut stored = h.storage.paths().await;
        stored.sort();
        let mut expected = kept.evidence_paths.clone();
        expected.sort();
        assert_eq!(stored, expected);
        assert_eq!(h.ctx.stores.warnings.list_for_todo(id).await.unwrap().len(), 1);
    }
}
