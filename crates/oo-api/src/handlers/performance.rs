//! Performance API handlers

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use oo_core::pagination::PaginationParams;
use oo_core::{Id, OoError};
use oo_services::PerformanceService;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub user_id: Option<Id>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// `YYYY-MM`; the current regional month when absent
    pub month: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl LeaderboardQuery {
    fn month(&self) -> Result<Option<(i32, u32)>, OoError> {
        let Some(raw) = self.month.as_deref().map(str::trim).filter(|m| !m.is_empty()) else {
            return Ok(None);
        };
        let parsed: Option<(i32, u32)> = raw
            .split_once('-')
            .and_then(|(year, month)| Some((year.parse().ok()?, month.parse().ok()?)));
        match parsed {
            Some((year, month)) if (1..=12).contains(&month) => Ok(Some((year, month))),
            _ => Err(OoError::invalid("month", "must look like YYYY-MM")),
        }
    }

    fn pagination(&self) -> PaginationParams {
        let defaults = PaginationParams::default();
        PaginationParams::new(
            self.page.unwrap_or(defaults.page),
            self.per_page.unwrap_or(defaults.per_page),
        )
    }
}

/// GET /api/performance/daily
pub async fn daily_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<DailyQuery>,
) -> ApiResult<impl IntoResponse> {
    let report = PerformanceService::new(&state.services, &user.0)
        .daily(query.user_id, query.date)
        .await?;
    Ok(Json(report))
}

/// GET /api/performance/leaderboard
pub async fn leaderboard(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = PerformanceService::new(&state.services, &user.0)
        .leaderboard(query.month()?, query.pagination())
        .await?;
    Ok(Json(page))
}
