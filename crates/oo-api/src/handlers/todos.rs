//! Todo API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use oo_contracts::EvaluateTodo;
use oo_core::Id;
use oo_db::TodoFilter;
use oo_models::{NewTodo, TodoStatus, UpdateTodo};
use oo_services::todos::{
    AddTodoNoteService, CreateTodoService, DeleteTodoService, EvaluateTodoService,
    StartTodoService, SubmitImprovementService, SubmitTodoService, TodoQueryService,
    UpdateTodoService,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser, FormData};
use crate::representers::TodoRepresenter;

/// Multipart field carrying evidence files
const EVIDENCE_FIELD: &str = "evidence";

#[derive(Debug, Deserialize)]
pub struct OwnTodosQuery {
    pub status: Option<TodoStatus>,
}

#[derive(Debug, Deserialize)]
pub struct AllTodosQuery {
    pub status: Option<TodoStatus>,
    pub user_id: Option<Id>,
}

#[derive(Debug, Deserialize)]
pub struct NoteBody {
    pub notes: Option<String>,
}

/// GET /api/todos
pub async fn list_todos(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<OwnTodosQuery>,
) -> ApiResult<impl IntoResponse> {
    let ctx = &state.services;
    let todos = TodoQueryService::new(ctx, &user.0).list_own(query.status).await?;
    Ok(Json(TodoRepresenter::represent_all(&state, todos).await))
}

/// GET /api/todos/all
pub async fn list_all_todos(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<AllTodosQuery>,
) -> ApiResult<impl IntoResponse> {
    let ctx = &state.services;
    let filter = TodoFilter {
        user_id: query.user_id,
        status: query.status,
    };
    let items = TodoQueryService::new(ctx, &user.0).list_all(filter).await?;

    let mut resources = Vec::with_capacity(items.len());
    for item in items {
        resources.push(TodoRepresenter::represent_with_owner(&state, item).await);
    }
    Ok(Json(resources))
}

/// POST /api/todos
pub async fn create_todo(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<NewTodo>,
) -> ApiResult<impl IntoResponse> {
    let ctx = &state.services;
    let todo = CreateTodoService::new(ctx, &user.0).call(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Todo created successfully",
            "todo": TodoRepresenter::represent(&state, todo).await,
        })),
    ))
}

/// PATCH /api/todos/:id
///
/// Text edits before checking; a full evidence resubmission while checking.
pub async fn update_todo(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    mut form: FormData,
) -> ApiResult<impl IntoResponse> {
    let ctx = &state.services;
    let changes = UpdateTodo {
        title: form.text("title"),
        description: form.sent_text("description"),
        due_date: form.date("due_date")?,
        scheduled_date: form.date("scheduled_date")?,
    };
    let uploads = form.take_files(EVIDENCE_FIELD);

    let todo = UpdateTodoService::new(ctx, &user.0)
        .call(id, changes, uploads)
        .await?;
    Ok(Json(json!({
        "message": "Todo updated successfully",
        "todo": TodoRepresenter::represent(&state, todo).await,
    })))
}

/// PATCH /api/todos/:id/start
pub async fn start_todo(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let ctx = &state.services;
    let todo = StartTodoService::new(ctx, &user.0).call(id).await?;
    Ok(Json(json!({
        "message": "Todo started",
        "todo": TodoRepresenter::represent(&state, todo).await,
    })))
}

/// POST /api/todos/:id/submit
pub async fn submit_todo(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    mut form: FormData,
) -> ApiResult<impl IntoResponse> {
    let ctx = &state.services;
    let uploads = form.take_files(EVIDENCE_FIELD);
    let todo = SubmitTodoService::new(ctx, &user.0).call(id, uploads).await?;
    Ok(Json(json!({
        "message": "Todo submitted for checking",
        "todo": TodoRepresenter::represent(&state, todo).await,
    })))
}

/// POST /api/todos/:id/evaluate
pub async fn evaluate_todo(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(input): Json<EvaluateTodo>,
) -> ApiResult<impl IntoResponse> {
    let ctx = &state.services;
    let outcome = EvaluateTodoService::new(ctx, &user.0).call(id, input).await?;
    Ok(Json(json!({
        "message": "Evaluation recorded",
        "todo": TodoRepresenter::represent(&state, outcome.todo).await,
        "warning": outcome.warning,
        "owner_finished": outcome.owner_finished,
    })))
}

/// POST /api/todos/:id/improvement
pub async fn submit_improvement(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    mut form: FormData,
) -> ApiResult<impl IntoResponse> {
    let ctx = &state.services;
    let uploads = form.take_files(EVIDENCE_FIELD);
    let todo = SubmitImprovementService::new(ctx, &user.0)
        .call(id, uploads)
        .await?;
    Ok(Json(json!({
        "message": "Improvement submitted",
        "todo": TodoRepresenter::represent(&state, todo).await,
    })))
}

/// PATCH /api/todos/:id/notes
pub async fn add_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(body): Json<NoteBody>,
) -> ApiResult<impl IntoResponse> {
    let ctx = &state.services;
    let todo = AddTodoNoteService::new(ctx, &user.0).call(id, body.notes).await?;
    Ok(Json(json!({
        "message": "Note added successfully",
        "todo": TodoRepresenter::represent(&state, todo).await,
    })))
}

/// DELETE /api/todos/:id
pub async fn delete_todo(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let deleted = DeleteTodoService::new(&state.services, &user.0).call(id).await?;
    Ok(Json(json!({
        "message": "Todo deleted successfully",
        "id": deleted.id,
        "retained_evidence": deleted.retained_evidence,
    })))
}

/// GET /api/todos/:id/warnings
pub async fn list_warnings(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let warnings = TodoQueryService::new(&state.services, &user.0)
        .list_warnings(id)
        .await?;
    Ok(Json(warnings))
}

/// GET /api/todos/users/:user_id/overall
pub async fn overall_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let stats = TodoQueryService::new(&state.services, &user.0)
        .overall_stats(user_id)
        .await?;
    Ok(Json(json!({
        "message": "Overall todo performance evaluation",
        "user_id": user_id,
        "stats": stats,
    })))
}
