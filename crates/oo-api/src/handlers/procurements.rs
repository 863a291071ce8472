//! Procurement API handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use oo_models::NewProcurement;
use oo_services::ProcurementService;
use serde_json::json;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// GET /api/procurements
pub async fn list_procurements(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    let procurements = ProcurementService::new(&state.services, &user.0).list().await?;
    Ok(Json(procurements))
}

/// POST /api/procurements
pub async fn create_procurement(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<NewProcurement>,
) -> ApiResult<impl IntoResponse> {
    let procurement = ProcurementService::new(&state.services, &user.0)
        .create(input)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Procurement recorded", "procurement": procurement })),
    ))
}
