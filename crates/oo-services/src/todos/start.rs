//! Start a todo

use oo_contracts::UserContext;
use oo_core::{Id, OoResult};
use oo_models::Todo;
use tracing::{info, instrument};

use super::find_owned_todo;
use crate::context::ServiceContext;

pub struct StartTodoService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> StartTodoService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    #[instrument(skip_all, fields(user_id = self.user.id(), todo_id = id))]
    pub async fn call(self, id: Id) -> OoResult<Todo> {
        let todo = find_owned_todo(self.ctx, self.user, id).await?;
        let next = todo.start(self.ctx.now())?;
        let saved = self.ctx.stores.todos.update(&next).await?;

        info!(status = %saved.status, "Todo started");
        Ok(saved)
    }
}
