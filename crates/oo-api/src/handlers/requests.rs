//! Item request API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use oo_core::Id;
use oo_models::{NewRequestItem, RequestItem, User};
use oo_services::{ApproveRequest, RequestItemService};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// A request with its requester embedded
#[derive(Debug, Serialize)]
pub struct RequestResource {
    #[serde(flatten)]
    pub request: RequestItem,
    pub user: Option<User>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectBody {
    pub ga_note: Option<String>,
}

/// GET /api/requests
pub async fn list_requests(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    let items = RequestItemService::new(&state.services, &user.0).list().await?;
    let resources: Vec<RequestResource> = items
        .into_iter()
        .map(|item| RequestResource {
            request: item.request,
            user: item.requester,
        })
        .collect();
    Ok(Json(resources))
}

/// POST /api/requests
pub async fn create_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<NewRequestItem>,
) -> ApiResult<impl IntoResponse> {
    let request = RequestItemService::new(&state.services, &user.0)
        .create(input)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Request created successfully", "request": request })),
    ))
}

/// PATCH /api/requests/:id/approve
pub async fn approve_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    body: Option<Json<ApproveRequest>>,
) -> ApiResult<impl IntoResponse> {
    let decision = body.map(|Json(decision)| decision).unwrap_or_default();
    let (request, asset) = RequestItemService::new(&state.services, &user.0)
        .approve(id, decision)
        .await?;
    Ok(Json(json!({
        "message": "Request approved",
        "request": request,
        "asset": asset,
    })))
}

/// PATCH /api/requests/:id/reject
pub async fn reject_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    body: Option<Json<RejectBody>>,
) -> ApiResult<impl IntoResponse> {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let request = RequestItemService::new(&state.services, &user.0)
        .reject(id, body.ga_note)
        .await?;
    Ok(Json(json!({ "message": "Request rejected", "request": request })))
}
