//! Spending analytics handlers

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Json,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::{current_user, AppError, AppState};
use spendwise_core::models::{CategoryStat, MonthlyBucket, SummaryStats, TrendPoint};
use spendwise_core::period::parse_date_range;

/// Query parameters for the monthly breakdown
#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    /// Calendar year; defaults to the current one
    pub year: Option<i32>,
}

/// Query parameters for the category breakdown
#[derive(Debug, Deserialize)]
pub struct CategoryWiseQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// GET /api/analytics/summary - Totals, this month vs last month
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<SummaryStats>, AppError> {
    let (identity, user) = current_user(&state, request.headers())?;

    let summary = state.db.summary_report(user.id, Utc::now())?;

    state
        .db
        .log_audit(&identity, "summary", Some("analytics"), None, None)?;

    Ok(Json(summary))
}

/// GET /api/analytics/monthly - Twelve monthly buckets for a year
pub async fn get_monthly_breakdown(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MonthlyQuery>,
    request: Request,
) -> Result<Json<Vec<MonthlyBucket>>, AppError> {
    let (identity, user) = current_user(&state, request.headers())?;

    let year = params.year.unwrap_or_else(|| Utc::now().year());
    let buckets = state.db.monthly_report(user.id, year)?;

    state.db.log_audit(
        &identity,
        "monthly",
        Some("analytics"),
        None,
        Some(&format!("year={}", year)),
    )?;

    Ok(Json(buckets))
}

/// GET /api/analytics/category-wise - Per-category totals and shares
pub async fn get_category_wise(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CategoryWiseQuery>,
    request: Request,
) -> Result<Json<Vec<CategoryStat>>, AppError> {
    let (identity, user) = current_user(&state, request.headers())?;

    let range = parse_date_range(params.start_date.as_deref(), params.end_date.as_deref())?;
    let stats = state
        .db
        .category_report(user.id, (!range.is_unbounded()).then_some(range))?;

    state.db.log_audit(
        &identity,
        "category_wise",
        Some("analytics"),
        None,
        Some(&format!("categories={}", stats.len())),
    )?;

    Ok(Json(stats))
}

/// GET /api/analytics/trends - Daily totals over the last 30 days
pub async fn get_trends(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<TrendPoint>>, AppError> {
    let (identity, user) = current_user(&state, request.headers())?;

    let points = state.db.trends_report(user.id, Utc::now())?;

    state.db.log_audit(
        &identity,
        "trends",
        Some("analytics"),
        None,
        Some(&format!("days={}", points.len())),
    )?;

    Ok(Json(points))
}
