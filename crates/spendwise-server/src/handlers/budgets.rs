//! Budget handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Deserializer};

use super::read_json;
use crate::{current_user, ensure_owner, AppError, AppState, SuccessResponse};
use spendwise_core::models::{
    Budget, BudgetPeriod, BudgetStatus, BudgetUpdate, NewBudget, DEFAULT_ALERT_THRESHOLD,
};
use spendwise_core::period::parse_bound;

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`)
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct CreateBudgetRequest {
    /// Omit for an all-spending budget
    #[serde(alias = "category")]
    pub category_id: Option<i64>,
    pub amount: f64,
    pub period: Option<String>,
    /// Defaults to now
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub alert_threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBudgetRequest {
    #[serde(default, alias = "category", deserialize_with = "nullable")]
    pub category_id: Option<Option<i64>>,
    pub amount: Option<f64>,
    pub period: Option<String>,
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub end_date: Option<Option<String>>,
    pub alert_threshold: Option<f64>,
}

fn parse_period(value: &str) -> Result<BudgetPeriod, AppError> {
    value.parse().map_err(|e: String| AppError::bad_request(&e))
}

/// GET /api/budgets - List the caller's budgets
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Budget>>, AppError> {
    let (identity, user) = current_user(&state, request.headers())?;

    let budgets = state.db.list_budgets(user.id)?;

    state.db.log_audit(
        &identity,
        "list",
        Some("budget"),
        None,
        Some(&format!("count={}", budgets.len())),
    )?;

    Ok(Json(budgets))
}

/// POST /api/budgets - Create a budget
pub async fn create_budget(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<Budget>), AppError> {
    let (identity, user) = current_user(&state, request.headers())?;
    let req: CreateBudgetRequest = read_json(request).await?;

    let period = match req.period.as_deref() {
        Some(p) => parse_period(p)?,
        None => BudgetPeriod::default(),
    };
    let start_date = match req.start_date.as_deref() {
        Some(s) => parse_bound(s, false)?,
        None => Utc::now(),
    };
    let end_date = req
        .end_date
        .as_deref()
        .map(|s| parse_bound(s, true))
        .transpose()?;

    let new_budget = NewBudget {
        category_id: req.category_id,
        amount: req.amount,
        period,
        start_date,
        end_date,
        alert_threshold: req.alert_threshold.unwrap_or(DEFAULT_ALERT_THRESHOLD),
    };
    let id = state.db.create_budget(user.id, &new_budget)?;

    state.db.log_audit(
        &identity,
        "create",
        Some("budget"),
        Some(id),
        Some(&format!("amount={}, period={}", new_budget.amount, period)),
    )?;

    let budget = state
        .db
        .get_budget(id)?
        .ok_or_else(|| AppError::internal("Budget not found after creation"))?;

    Ok((StatusCode::CREATED, Json(budget)))
}

/// PUT /api/budgets/:id - Update a budget
pub async fn update_budget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Budget>, AppError> {
    let (identity, user) = current_user(&state, request.headers())?;
    let req: UpdateBudgetRequest = read_json(request).await?;

    let existing = state
        .db
        .get_budget(id)?
        .ok_or_else(|| AppError::not_found("Budget not found"))?;
    ensure_owner(&user, existing.user_id)?;

    let end_date = match req.end_date {
        Some(Some(s)) => Some(Some(parse_bound(&s, true)?)),
        Some(None) => Some(None),
        None => None,
    };

    let update = BudgetUpdate {
        category_id: req.category_id,
        amount: req.amount,
        period: req.period.as_deref().map(parse_period).transpose()?,
        start_date: req
            .start_date
            .as_deref()
            .map(|s| parse_bound(s, false))
            .transpose()?,
        end_date,
        alert_threshold: req.alert_threshold,
    };
    state.db.update_budget(id, &update)?;

    state
        .db
        .log_audit(&identity, "update", Some("budget"), Some(id), None)?;

    let budget = state
        .db
        .get_budget(id)?
        .ok_or_else(|| AppError::not_found("Budget not found"))?;

    Ok(Json(budget))
}

/// DELETE /api/budgets/:id - Delete a budget
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let (identity, user) = current_user(&state, request.headers())?;

    let existing = state
        .db
        .get_budget(id)?
        .ok_or_else(|| AppError::not_found("Budget not found"))?;
    ensure_owner(&user, existing.user_id)?;

    state.db.delete_budget(id)?;

    state
        .db
        .log_audit(&identity, "delete", Some("budget"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/budgets/status - Spending against each budget in its current window
pub async fn get_budget_status(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<BudgetStatus>>, AppError> {
    let (identity, user) = current_user(&state, request.headers())?;

    let statuses = state.db.budget_status_report(user.id, Utc::now()).await?;

    let over = statuses.iter().filter(|s| s.is_over_budget).count();
    state.db.log_audit(
        &identity,
        "status",
        Some("budget"),
        None,
        Some(&format!("count={}, over={}", statuses.len(), over)),
    )?;

    Ok(Json(statuses))
}
