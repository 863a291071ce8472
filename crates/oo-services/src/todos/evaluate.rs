//! Evaluate a todo
//!
//! Approving completes the todo and may attach a warning; a rework sends it
//! back to the owner. Either way the evidence files are renamed to carry the
//! verdict.

use oo_contracts::{
    require_evaluator, Contract, EvaluateTodo, EvaluationAction, EvaluationContract,
    EvaluationScope, UserContext,
};
use oo_core::{Id, OoError, OoResult};
use oo_db::TodoFilter;
use oo_evidence::Stage;
use oo_models::{EvaluationRecord, Todo, TodoAction, TodoStatus, TodoWarning};
use tracing::{error, info, instrument};

use super::find_todo;
use crate::context::ServiceContext;

#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    pub todo: Todo,
    /// Issued when an approval carried warning points
    pub warning: Option<TodoWarning>,
    /// For overall evaluations: whether the owner has no open todo left
    pub owner_finished: Option<bool>,
}

pub struct EvaluateTodoService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> EvaluateTodoService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    #[instrument(
        skip_all,
        fields(evaluator_id = self.user.id(), todo_id = id, action = input.action.as_str())
    )]
    pub async fn call(self, id: Id, input: EvaluateTodo) -> OoResult<EvaluationOutcome> {
        require_evaluator(self.user, "evaluate todos")?;
        EvaluationContract.validate(&input).map_err(OoError::from)?;

        let todo = find_todo(self.ctx, id).await?;
        let (action, stage) = match input.action {
            EvaluationAction::Approve => (TodoAction::Approve, Stage::Approved),
            EvaluationAction::Rework => (TodoAction::Rework, Stage::Rework),
        };
        todo.status.apply(action)?;

        let now = self.ctx.now();
        let renamed = self.ctx.evidence.restage_all(&todo.evidence_paths, stage).await;
        let record = EvaluationRecord {
            evaluator_id: self.user.id(),
            checker_display: self.user.checker_display(),
            notes: input.notes.clone(),
        };
        let next = match input.action {
            EvaluationAction::Approve => todo.approve(&record, renamed.clone(), now)?,
            EvaluationAction::Rework => todo.send_back(&record, renamed.clone(), now)?,
        };

        let saved = match self.ctx.stores.todos.update(&next).await {
            Ok(saved) => saved,
            Err(err) => {
                error!(error = %err, "Failed to save evaluation");
                self.ctx.evidence.revert(&todo.evidence_paths, &renamed).await;
                return Err(err.into());
            }
        };

        let warning = match TodoWarning::issue(
            &saved,
            self.user.id(),
            input.effective_points(),
            input.notes.clone(),
            now,
        ) {
            Some(warning) => Some(self.ctx.stores.warnings.insert(&warning).await?),
            None => None,
        };

        info!(
            status = %saved.status,
            warning_points = warning.as_ref().map(|w| w.points),
            "Evaluation recorded"
        );

        let owner_finished = match input.scope {
            EvaluationScope::Individual => None,
            EvaluationScope::Overall => Some(self.owner_finished(saved.user_id).await?),
        };

        Ok(EvaluationOutcome {
            todo: saved,
            warning,
            owner_finished,
        })
    }

    async fn owner_finished(&self, owner_id: Id) -> OoResult<bool> {
        let todos = self
            .ctx
            .stores
            .todos
            .list(TodoFilter::for_user(owner_id))
            .await?;
        let finished = todos.iter().all(|t| t.status == TodoStatus::Completed);
        if finished {
            info!(user_id = owner_id, "User has completed all todos");
        }
        Ok(finished)
    }
}
