//! Todo services
//!
//! One service per lifecycle operation:
//! - create / start / submit for checking
//! - update (text edits before checking, evidence replacement while checking)
//! - evaluate (approve or rework, with optional warning points)
//! - submit improvement after a rework
//! - notes, delete, listings and statistics

mod create;
mod start;
mod submit;
mod update;
mod evaluate;
mod improvement;
mod notes;
mod delete;
mod query;

pub use create::CreateTodoService;
pub use start::StartTodoService;
pub use submit::SubmitTodoService;
pub use update::UpdateTodoService;
pub use evaluate::{EvaluateTodoService, EvaluationOutcome};
pub use improvement::SubmitImprovementService;
pub use notes::AddTodoNoteService;
pub use delete::{DeleteTodoService, DeletedTodo};
pub use query::{OverallStats, TodoQueryService, TodoWithOwner};

use oo_contracts::{require_owner, Contract, UserContext};
use oo_core::{Id, OoError, OoResult};
use oo_evidence::{EvidenceBatch, EvidenceUpload, Stage};
use oo_models::Todo;
use tracing::error;

use crate::context::ServiceContext;

pub(crate) async fn find_todo(ctx: &ServiceContext, id: Id) -> OoResult<Todo> {
    ctx.stores
        .todos
        .find(id)
        .await?
        .ok_or_else(|| OoError::not_found("Todo", id))
}

/// Todos are private to their owner; anyone else gets `NotFound`
pub(crate) async fn find_owned_todo(
    ctx: &ServiceContext,
    user: &dyn UserContext,
    id: Id,
) -> OoResult<Todo> {
    let todo = find_todo(ctx, id).await?;
    require_owner(user, todo.user_id, "Todo", id)?;
    Ok(todo)
}

pub(crate) fn check_evidence(ctx: &ServiceContext, uploads: &[EvidenceUpload]) -> OoResult<()> {
    ctx.evidence_contract
        .validate(uploads)
        .map_err(OoError::from)
}

/// Naming context for files submitted by `user` on `todo` right now
pub(crate) fn evidence_batch(
    ctx: &ServiceContext,
    user: &dyn UserContext,
    todo: &Todo,
    stage: Option<Stage>,
) -> EvidenceBatch {
    EvidenceBatch {
        user_id: todo.user_id,
        user_name: user.display_name().to_string(),
        sequence: todo.daily_sequence,
        at: ctx.local_now(),
        locale: ctx.locale,
        stage,
    }
}

/// Persists `next`. When the write fails the freshly staged files are
/// removed so no orphan is left behind.
pub(crate) async fn commit(ctx: &ServiceContext, next: &Todo, staged: &[String]) -> OoResult<Todo> {
    match ctx.stores.todos.update(next).await {
        Ok(saved) => Ok(saved),
        Err(err) => {
            error!(todo_id = ?next.id, error = %err, "Failed to save todo");
            ctx.evidence.discard(staged).await;
            Err(err.into())
        }
    }
}
