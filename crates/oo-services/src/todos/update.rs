//! Update a todo
//!
//! Before checking only the text fields change. While checking the owner
//! replaces the whole evidence set; text edits are ignored in that phase.
//! Later statuses are closed for edits.

use oo_contracts::{validate_attributes, UserContext};
use oo_core::{Id, OoError, OoResult};
use oo_evidence::{EvidenceUpload, Stage};
use oo_models::{Todo, TodoAction, TodoStatus, UpdateTodo};
use tracing::{info, instrument};

use super::{check_evidence, commit, evidence_batch, find_owned_todo};
use crate::context::ServiceContext;

pub struct UpdateTodoService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> UpdateTodoService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    #[instrument(skip_all, fields(user_id = self.user.id(), todo_id = id, files = uploads.len()))]
    pub async fn call(
        self,
        id: Id,
        changes: UpdateTodo,
        uploads: Vec<EvidenceUpload>,
    ) -> OoResult<Todo> {
        let todo = find_owned_todo(self.ctx, self.user, id).await?;

        match todo.status {
            TodoStatus::NotStarted | TodoStatus::InProgress => {
                self.edit_details(&todo, &changes, &uploads).await
            }
            TodoStatus::Checking => self.replace_evidence(&todo, &uploads).await,
            _ => Err(OoError::invalid_transition(
                "todo",
                todo.status,
                TodoAction::EditDetails.as_str(),
            )),
        }
    }

    async fn edit_details(
        &self,
        todo: &Todo,
        changes: &UpdateTodo,
        uploads: &[EvidenceUpload],
    ) -> OoResult<Todo> {
        if !uploads.is_empty() {
            return Err(OoError::invalid(
                "evidence",
                "can only be attached after the todo is submitted for checking",
            ));
        }
        validate_attributes(changes)?;

        let next = todo.with_details(changes, self.ctx.now())?;
        let saved = self.ctx.stores.todos.update(&next).await?;
        info!("Todo details updated");
        Ok(saved)
    }

    async fn replace_evidence(&self, todo: &Todo, uploads: &[EvidenceUpload]) -> OoResult<Todo> {
        check_evidence(self.ctx, uploads)?;

        let batch = evidence_batch(self.ctx, self.user, todo, Some(Stage::UpdatedChecking));
        let staged = self.ctx.evidence.store_batch(&batch, uploads).await?;

        let next = todo.resubmit_evidence(staged.clone(), self.ctx.now())?;
        let saved = commit(self.ctx, &next, &staged).await?;

        self.ctx
            .evidence
            .purge_superseded(&todo.evidence_paths, &saved.evidence_paths)
            .await;
        info!(files = saved.evidence_paths.len(), "Todo evidence replaced");
        Ok(saved)
    }
}
