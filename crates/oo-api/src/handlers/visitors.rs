//! Visitor API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use oo_core::pagination::PaginationParams;
use oo_core::Id;
use oo_models::NewVisitor;
use oo_services::{VisitorRegistration, VisitorService};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser, FormData};
use crate::representers::VisitorRepresenter;

#[derive(Debug, Deserialize)]
pub struct VisitorListQuery {
    pub date: Option<NaiveDate>,
    /// Matches name or meet-with
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// GET /api/visitors
pub async fn list_visitors(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<VisitorListQuery>,
) -> ApiResult<impl IntoResponse> {
    let ctx = &state.services;
    let defaults = PaginationParams::default();
    let pagination = PaginationParams::new(
        query.page.unwrap_or(defaults.page),
        query.per_page.unwrap_or(defaults.per_page),
    );
    let search = query.search.filter(|s| !s.trim().is_empty());

    let page = VisitorService::new(ctx, &user.0)
        .list(query.date, search, pagination)
        .await?;
    Ok(Json(page.map(|visitor| VisitorRepresenter::represent(&state, visitor))))
}

/// POST /api/visitors
pub async fn register_visitor(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    mut form: FormData,
) -> ApiResult<impl IntoResponse> {
    let ctx = &state.services;
    let registration = VisitorRegistration {
        visitor: NewVisitor {
            name: form.text("name").unwrap_or_default(),
            meet_with: form.text("meet_with").unwrap_or_default(),
            purpose: form.text("purpose").unwrap_or_default(),
            origin: form.text("origin"),
        },
        ktp_image: form.take_file("ktp_image"),
        face_image: form.take_file("face_image"),
    };

    let visitor = VisitorService::new(ctx, &user.0).register(registration).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Visitor registered",
            "visitor": VisitorRepresenter::represent(&state, visitor),
        })),
    ))
}

/// GET /api/visitors/:id
pub async fn show_visitor(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let ctx = &state.services;
    let visitor = VisitorService::new(ctx, &user.0).show(id).await?;
    Ok(Json(VisitorRepresenter::represent(&state, visitor)))
}

/// PATCH /api/visitors/:id/check-in
pub async fn check_in_visitor(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let ctx = &state.services;
    let visitor = VisitorService::new(ctx, &user.0).check_in(id).await?;
    Ok(Json(json!({
        "message": "Visitor checked in",
        "visitor": VisitorRepresenter::represent(&state, visitor),
    })))
}

/// PATCH /api/visitors/:id/check-out
pub async fn check_out_visitor(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let ctx = &state.services;
    let visitor = VisitorService::new(ctx, &user.0).check_out(id).await?;
    Ok(Json(json!({
        "message": "Visitor checked out",
        "visitor": VisitorRepresenter::represent(&state, visitor),
    })))
}
