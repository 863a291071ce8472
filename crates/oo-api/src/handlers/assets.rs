//! Asset API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use oo_core::Id;
use oo_models::NewAsset;
use oo_services::{AssetService, AssetStatusChange};
use serde_json::json;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// GET /api/assets
pub async fn list_assets(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    let assets = AssetService::new(&state.services, &user.0).list().await?;
    Ok(Json(assets))
}

/// POST /api/assets
pub async fn create_asset(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<NewAsset>,
) -> ApiResult<impl IntoResponse> {
    let asset = AssetService::new(&state.services, &user.0).create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Asset created", "asset": asset })),
    ))
}

/// PATCH /api/assets/:id/status
pub async fn update_asset_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(change): Json<AssetStatusChange>,
) -> ApiResult<impl IntoResponse> {
    let asset = AssetService::new(&state.services, &user.0)
        .update_status(id, change)
        .await?;
    Ok(Json(json!({ "message": "Asset updated", "asset": asset })))
}
