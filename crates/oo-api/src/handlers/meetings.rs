//! Meeting API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use oo_core::Id;
use oo_models::NewMeeting;
use oo_services::MeetingService;
use serde_json::json;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// GET /api/meetings
pub async fn list_meetings(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    let meetings = MeetingService::new(&state.services, &user.0).list().await?;
    Ok(Json(meetings))
}

/// POST /api/meetings
pub async fn book_meeting(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<NewMeeting>,
) -> ApiResult<impl IntoResponse> {
    let meeting = MeetingService::new(&state.services, &user.0).book(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Meeting booked", "meeting": meeting })),
    ))
}

/// PATCH /api/meetings/:id/start
pub async fn start_meeting(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let meeting = MeetingService::new(&state.services, &user.0).start(id).await?;
    Ok(Json(json!({ "message": "Meeting started", "meeting": meeting })))
}

/// PATCH /api/meetings/:id/end
pub async fn end_meeting(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let meeting = MeetingService::new(&state.services, &user.0).end(id).await?;
    Ok(Json(json!({ "message": "Meeting ended", "meeting": meeting })))
}

/// PATCH /api/meetings/:id/force-end
pub async fn force_end_meeting(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let meeting = MeetingService::new(&state.services, &user.0)
        .force_end(id)
        .await?;
    Ok(Json(json!({ "message": "Meeting force ended", "meeting": meeting })))
}
