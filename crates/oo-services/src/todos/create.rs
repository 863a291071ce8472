//! Create a todo

use oo_contracts::{validate_attributes, UserContext};
use oo_core::OoResult;
use oo_models::{NewTodo, Todo};
use tracing::{info, instrument};

use crate::context::ServiceContext;

/// Creates a todo in `not_started` for the acting user
///
/// # Example
/// ```ignore
/// let todo = CreateTodoService::new(&ctx, &user)
///     .call(NewTodo { title: "Weekly report".into(), ..Default::default() })
///     .await?;
/// ```
pub struct CreateTodoService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> CreateTodoService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    #[instrument(skip_all, fields(user_id = self.user.id()))]
    pub async fn call(self, input: NewTodo) -> OoResult<Todo> {
        validate_attributes(&input)?;

        let now = self.ctx.now();
        let (day_start, day_end) = self.ctx.region.day_bounds(self.ctx.region.local_date(now));
        // Numbers freed by deletes stay retired
        let highest_today = self
            .ctx
            .stores
            .todos
            .max_daily_sequence(self.user.id(), day_start, day_end)
            .await?;
        let sequence = highest_today.saturating_add(1);

        let todo = Todo::create(
            self.user.id(),
            input.title,
            input.description,
            input.due_date,
            input.scheduled_date,
            sequence,
            now,
        );
        let saved = self.ctx.stores.todos.insert(&todo).await?;

        info!(todo_id = ?saved.id, daily_sequence = saved.daily_sequence, "Todo created");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{harness, png, OWNER, STRANGER};
    use crate::todos::{DeleteTodoService, StartTodoService, SubmitTodoService};
    use chrono::Duration;
    use oo_models::TodoStatus;

    fn input(title: &str) -> NewTodo {
        NewTodo {
            title: title.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_starts_not_started() {
        let h = harness().await;
        let todo = CreateTodoService::new(&h.ctx, &OWNER)
            .call(input("Weekly report"))
            .await
            .unwrap();

        assert!(todo.id.is_some());
        assert_eq!(todo.user_id, OWNER.id);
        assert_eq!(todo.status, TodoStatus::NotStarted);
        assert_eq!(todo.daily_sequence, 1);
    }

    #[tokio::test]
    async fn test_daily_sequence_counts_per_user_and_day() {
        let h = harness().await;
        for expected in 1..=3 {
            let todo = CreateTodoService::new(&h.ctx, &OWNER)
                .call(input("Task"))
                .await
                .unwrap();
            assert_eq!(todo.daily_sequence, expected);
        }

        let other = CreateTodoService::new(&h.ctx, &STRANGER)
            .call(input("Task"))
            .await
            .unwrap();
        assert_eq!(other.daily_sequence, 1);

        // 18:00 UTC is 01:00 the next regional day
        h.clock.advance(Duration::hours(16));
        let tomorrow = CreateTodoService::new(&h.ctx, &OWNER)
            .call(input("Task"))
            .await
            .unwrap();
        assert_eq!(tomorrow.daily_sequence, 1);
    }

    #[tokio::test]
    async fn test_deleted_sequence_is_not_reused() {
        let h = harness().await;
        let create = || CreateTodoService::new(&h.ctx, &OWNER).call(input("Task"));
        let first = create().await.unwrap();
        let second = create().await.unwrap();
        DeleteTodoService::new(&h.ctx, &OWNER)
            .call(first.id.unwrap())
            .await
            .unwrap();
        let third = create().await.unwrap();
        assert_eq!(third.daily_sequence, 3);

        let mut evidence = Vec::new();
        for todo in [&second, &third] {
            let id = todo.id.unwrap();
            StartTodoService::new(&h.ctx, &OWNER).call(id).await.unwrap();
            let submitted = SubmitTodoService::new(&h.ctx, &OWNER)
                .call(id, vec![png("photo.png")])
                .await
                .unwrap();
            evidence.extend(submitted.evidence_paths);
        }

        assert_ne!(evidence[0], evidence[1]);
        assert_eq!(h.storage.paths().await.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_title_is_rejected() {
        let h = harness().await;
        let err = CreateTodoService::new(&h.ctx, &OWNER)
            .call(input(""))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 422);
    }
}
