//! Answer a rework request

use oo_contracts::UserContext;
use oo_core::{Id, OoResult};
use oo_evidence::{EvidenceUpload, Stage};
use oo_models::{Todo, TodoAction};
use tracing::{info, instrument};

use super::{check_evidence, commit, evidence_batch, find_owned_todo};
use crate::context::ServiceContext;

/// Moves a todo from `evaluating` to `reworked`. New evidence is optional;
/// when given it replaces the previous files.
pub struct SubmitImprovementService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> SubmitImprovementService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    #[instrument(skip_all, fields(user_id = self.user.id(), todo_id = id, files = uploads.len()))]
    pub async fn call(self, id: Id, uploads: Vec<EvidenceUpload>) -> OoResult<Todo> {
        let todo = find_owned_todo(self.ctx, self.user, id).await?;
        todo.status.apply(TodoAction::SubmitImprovement)?;

        if uploads.is_empty() {
            let next = todo.submit_improvement(None, self.ctx.now())?;
            let saved = self.ctx.stores.todos.update(&next).await?;
            info!("Improvement submitted without new evidence");
            return Ok(saved);
        }

        check_evidence(self.ctx, &uploads)?;
        let batch = evidence_batch(self.ctx, self.user, &todo, Some(Stage::Reworked));
        let staged = self.ctx.evidence.store_batch(&batch, &uploads).await?;

        let next = todo.submit_improvement(Some(staged.clone()), self.ctx.now())?;
        let saved = commit(self.ctx, &next, &staged).await?;

        self.ctx
            .evidence
            .purge_superseded(&todo.evidence_paths, &saved.evidence_paths)
            .await;
        info!(files = saved.evidence_paths.len(), "Improvement submitted");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{checking_todo, harness, pngs, Harness, GA, OWNER, STRANGER};
    use crate::todos::EvaluateTodoService;
    use oo_contracts::EvaluateTodo;
    use oo_models::TodoStatus;

    async fn reworked_todo(h: &Harness) -> Todo {
        let todo = checking_todo(h, 2).await;
        EvaluateTodoService::new(&h.ctx, &GA)
            .call(todo.id.unwrap(), EvaluateTodo::rework().with_notes("Foto buram"))
            .await
            .unwrap()
            .todo
    }

    #[tokio::test]
    async fn test_improvement_keeps_evidence_when_none_given() {
        let h = harness().await;
        let todo = reworked_todo(&h).await;

        let improved = SubmitImprovementService::new(&h.ctx, &OWNER)
            .call(todo.id.unwrap(), vec![])
            .await
            .unwrap();
        assert_eq!(improved.status, TodoStatus::Reworked);
        assert_eq!(improved.evidence_paths, todo.evidence_paths);
    }

    #[tokio::test]
    async fn test_improvement_replaces_evidence() {
        let h = harness().await;
        let todo = reworked_todo(&h).await;

        let improved = SubmitImprovementService::new(&h.ctx, &OWNER)
            .call(todo.id.unwrap(), pngs(1))
            .await
            .unwrap();
        assert_eq!(improved.evidence_paths.len(), 1);
        assert!(improved.evidence_paths[0].ends_with("-Reworked.png"));
        assert_eq!(h.storage.paths().await, improved.evidence_paths);

        // A reworked todo can be evaluated again
        let outcome = EvaluateTodoService::new(&h.ctx, &GA)
            .call(todo.id.unwrap(), EvaluateTodo::approve())
            .await
            .unwrap();
        assert_eq!(outcome.todo.status, TodoStatus::Completed);
        assert!(outcome.todo.evidence_paths[0].ends_with("-Approved.png"));
    }

    #[tokio::test]
    async fn test_improvement_outside_phase() {
        let h = harness().await;
        let todo = checking_todo(&h, 1).await;

        let err = SubmitImprovementService::new(&h.ctx, &OWNER)
            .call(todo.id.unwrap(), vec![])
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "invalid_phase");
    }

    #[tokio::test]
    async fn test_only_owner_submits_improvement() {
        let h = harness().await;
        let todo = reworked_todo(&h).await;

        let err = SubmitImprovementService::new(&h.ctx, &STRANGER)
            .call(todo.id.unwrap(), vec![])
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
