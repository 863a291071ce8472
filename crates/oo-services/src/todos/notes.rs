//! Evaluator notes

use oo_contracts::{require_evaluator, UserContext};
use oo_core::{Id, OoResult};
use oo_models::Todo;
use tracing::{info, instrument};

use super::find_todo;
use crate::context::ServiceContext;

pub struct AddTodoNoteService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> AddTodoNoteService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    /// Replaces the notes; blank text clears them
    #[instrument(skip_all, fields(evaluator_id = self.user.id(), todo_id = id))]
    pub async fn call(self, id: Id, notes: Option<String>) -> OoResult<Todo> {
        require_evaluator(self.user, "add notes")?;
        let todo = find_todo(self.ctx, id).await?;

        let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        let saved = self
            .ctx
            .stores
            .todos
            .update(&todo.with_notes(notes, self.ctx.now()))
            .await?;

        info!("Note added");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{harness, started_todo, GA, OWNER};

    #[tokio::test]
    async fn test_evaluator_sets_notes() {
        let h = harness().await;
        let id = started_todo(&h).await;

        let todo = AddTodoNoteService::new(&h.ctx, &GA)
            .call(id, Some("  Check the fridge too ".into()))
            .await
            .unwrap();
        assert_eq!(todo.notes.as_deref(), Some("Check the fridge too"));

        let cleared = AddTodoNoteService::new(&h.ctx, &GA)
            .call(id, Some("   ".into()))
            .await
            .unwrap();
        assert_eq!(cleared.notes, None);
    }

    #[tokio::test]
    async fn test_owner_cannot_add_notes() {
        let h = harness().await;
        let id = started_todo(&h).await;

        let err = AddTodoNoteService::new(&h.ctx, &OWNER)
            .call(id, Some("self review".into()))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }
}
