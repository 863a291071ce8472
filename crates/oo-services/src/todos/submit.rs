//! Submit a todo for checking

use oo_contracts::UserContext;
use oo_core::{Id, OoResult};
use oo_evidence::EvidenceUpload;
use oo_models::{Todo, TodoAction};
use tracing::{info, instrument};

use super::{check_evidence, commit, evidence_batch, find_owned_todo};
use crate::context::ServiceContext;

/// Attaches the first evidence batch and moves the todo to `checking`
pub struct SubmitTodoService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> SubmitTodoService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    #[instrument(skip_all, fields(user_id = self.user.id(), todo_id = id, files = uploads.len()))]
    pub async fn call(self, id: Id, uploads: Vec<EvidenceUpload>) -> OoResult<Todo> {
        let todo = find_owned_todo(self.ctx, self.user, id).await?;
        todo.status.apply(TodoAction::SubmitForChecking)?;
        check_evidence(self.ctx, &uploads)?;

        let batch = evidence_batch(self.ctx, self.user, &todo, None);
        let staged = self.ctx.evidence.store_batch(&batch, &uploads).await?;

        let next = todo.submit_for_checking(staged.clone(), self.ctx.now(), self.ctx.locale)?;
        let saved = commit(self.ctx, &next, &staged).await?;

        info!(
            work_minutes = ?saved.total_work_time,
            files = saved.evidence_paths.len(),
            "Todo submitted for checking"
        );
        Ok(saved)
    }
}
