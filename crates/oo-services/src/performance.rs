//! Warning-based performance scoring
//!
//! A user starts every day at 100 points and loses one point per three
//! warning points, never dropping below zero. The monthly leaderboard ranks
//! users by accumulated warning points, fewest penalties last.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use oo_contracts::UserContext;
use oo_core::pagination::{Page, PaginationParams};
use oo_core::{Id, OoError, OoResult};
use oo_models::{TodoWarning, WarningLevel};
use serde::Serialize;
use tracing::instrument;

use crate::context::ServiceContext;

/// `max(0, 100 - min(100, floor(total / 3)))`
pub fn daily_score(total_points: i64) -> i64 {
    (100 - (total_points.max(0) / 3).min(100)).max(0)
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyReport {
    pub user_id: Id,
    pub date: NaiveDate,
    pub total_points: i64,
    pub warning_count: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub score: i64,
    pub warnings: Vec<TodoWarning>,
}

impl DailyReport {
    fn build(user_id: Id, date: NaiveDate, warnings: Vec<TodoWarning>) -> Self {
        let level = |level: WarningLevel| warnings.iter().filter(|w| w.level == level).count();
        let total_points: i64 = warnings.iter().map(|w| i64::from(w.points)).sum();

        Self {
            user_id,
            date,
            total_points,
            warning_count: warnings.len(),
            low: level(WarningLevel::Low),
            medium: level(WarningLevel::Medium),
            high: level(WarningLevel::High),
            score: daily_score(total_points),
            warnings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based, assigned before pagination
    pub rank: usize,
    pub user_id: Id,
    pub name: Option<String>,
    pub total_points: i64,
    pub warning_count: usize,
}

pub struct PerformanceService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> PerformanceService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    /// Report for one user and regional day; defaults to the caller and today.
    /// Only evaluators may look at other users.
    #[instrument(skip_all, fields(viewer_id = self.user.id()))]
    pub async fn daily(&self, user_id: Option<Id>, date: Option<NaiveDate>) -> OoResult<DailyReport> {
        let user_id = user_id.unwrap_or_else(|| self.user.id());
        if user_id != self.user.id() && !self.user.is_evaluator() {
            return Err(OoError::forbidden(
                "Only GA or admin users may view other users' performance",
            ));
        }

        let date = date.unwrap_or_else(|| self.ctx.region.local_date(self.ctx.now()));
        let (start, end) = self.ctx.region.day_bounds(date);
        let warnings = self
            .ctx
            .stores
            .warnings
            .list_between(Some(user_id), start, end)
            .await?;

        Ok(DailyReport::build(user_id, date, warnings))
    }

    /// Monthly ranking of every known user; defaults to the current month
    #[instrument(skip_all, fields(viewer_id = self.user.id()))]
    pub async fn leaderboard(
        &self,
        month: Option<(i32, u32)>,
        pagination: PaginationParams,
    ) -> OoResult<Page<LeaderboardEntry>> {
        let (year, month) = month.unwrap_or_else(|| self.ctx.region.year_month(self.ctx.now()));
        let (start, end) = self.ctx.region.month_bounds(year, month)?;

        let warnings = self.ctx.stores.warnings.list_between(None, start, end).await?;
        let users = self.ctx.stores.users.list().await?;

        // user id -> (name, points, count)
        let mut totals: BTreeMap<Id, (Option<String>, i64, usize)> = users
            .into_iter()
            .filter_map(|user| user.id.map(|id| (id, (Some(user.name), 0, 0))))
            .collect();
        for warning in &warnings {
            let entry = totals.entry(warning.user_id).or_insert((None, 0, 0));
            entry.1 += i64::from(warning.points);
            entry.2 += 1;
        }

        let mut ranked: Vec<(Id, (Option<String>, i64, usize))> = totals.into_iter().collect();
        ranked.sort_by(|(a_id, a), (b_id, b)| b.1.cmp(&a.1).then(a_id.cmp(b_id)));

        let entries = ranked
            .into_iter()
            .enumerate()
            .map(|(i, (user_id, (name, total_points, warning_count)))| LeaderboardEntry {
                rank: i + 1,
                user_id,
                name,
                total_points,
                warning_count,
            })
            .collect();

        Ok(pagination.normalized().paginate(entries))
    }
}
