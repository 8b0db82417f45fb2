//! Expense handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use super::read_json;
use crate::{current_user, ensure_owner, AppError, AppState, SuccessResponse, MAX_PAGE_LIMIT};
use spendwise_core::models::{Expense, ExpenseFilter, ExpensePage, ExpenseUpdate, NewExpense, PaymentMethod};
use spendwise_core::period::{parse_bound, parse_date_range};

/// Query parameters for listing expenses
#[derive(Debug, Deserialize)]
pub struct ExpenseQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Category ID
    pub category: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Case-insensitive match on title or description
    pub search: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

/// Request body for creating an expense
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub title: String,
    pub amount: f64,
    #[serde(alias = "category")]
    pub category_id: i64,
    /// Defaults to now
    pub date: Option<String>,
    #[serde(default)]
    pub description: String,
    pub payment_method: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request body for updating an expense
#[derive(Debug, Deserialize)]
pub struct UpdateExpenseRequest {
    pub title: Option<String>,
    pub amount: Option<f64>,
    #[serde(alias = "category")]
    pub category_id: Option<i64>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub tags: Option<Vec<String>>,
}

fn parse_payment_method(value: &str) -> Result<PaymentMethod, AppError> {
    value.parse().map_err(|e: String| AppError::bad_request(&e))
}

/// GET /api/expenses - List the caller's expenses, newest first
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExpenseQuery>,
    request: Request,
) -> Result<Json<ExpensePage>, AppError> {
    let (identity, user) = current_user(&state, request.headers())?;

    let page = params.page.max(1);
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);
    let range = parse_date_range(params.start_date.as_deref(), params.end_date.as_deref())?;

    let filter = ExpenseFilter::new()
        .category_id(params.category)
        .date_range((!range.is_unbounded()).then_some(range))
        .search(params.search.clone());

    let result = state.db.list_expenses_page(user.id, &filter, page, limit)?;

    // Audit log - read access
    state.db.log_audit(
        &identity,
        "list",
        Some("expense"),
        None,
        Some(&format!(
            "page={}, limit={}, count={}",
            page,
            limit,
            result.expenses.len()
        )),
    )?;

    Ok(Json(result))
}

/// GET /api/expenses/:id - Get a single expense
pub async fn get_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Expense>, AppError> {
    let (identity, user) = current_user(&state, request.headers())?;

    let expense = state
        .db
        .get_expense(id)?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;
    ensure_owner(&user, expense.user_id)?;

    state
        .db
        .log_audit(&identity, "get", Some("expense"), Some(id), None)?;

    Ok(Json(expense))
}

/// POST /api/expenses - Record an expense
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<Expense>), AppError> {
    let (identity, user) = current_user(&state, request.headers())?;
    let req: CreateExpenseRequest = read_json(request).await?;

    let date = match req.date.as_deref() {
        Some(s) => parse_bound(s, false)?,
        None => Utc::now(),
    };
    let payment_method = match req.payment_method.as_deref() {
        Some(m) => parse_payment_method(m)?,
        None => PaymentMethod::default(),
    };

    let new_expense = NewExpense {
        title: req.title,
        amount: req.amount,
        category_id: req.category_id,
        date,
        description: req.description,
        payment_method,
        tags: req.tags,
    };
    let id = state.db.create_expense(user.id, &new_expense)?;

    state.db.log_audit(
        &identity,
        "create",
        Some("expense"),
        Some(id),
        Some(&format!("amount={}", new_expense.amount)),
    )?;

    let expense = state
        .db
        .get_expense(id)?
        .ok_or_else(|| AppError::internal("Expense not found after creation"))?;

    Ok((StatusCode::CREATED, Json(expense)))
}

/// PUT /api/expenses/:id - Update an expense
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Expense>, AppError> {
    let (identity, user) = current_user(&state, request.headers())?;
    let req: UpdateExpenseRequest = read_json(request).await?;

    let existing = state
        .db
        .get_expense(id)?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;
    ensure_owner(&user, existing.user_id)?;

    let update = ExpenseUpdate {
        title: req.title,
        amount: req.amount,
        category_id: req.category_id,
        date: req.date.as_deref().map(|s| parse_bound(s, false)).transpose()?,
        description: req.description,
        payment_method: req
            .payment_method
            .as_deref()
            .map(parse_payment_method)
            .transpose()?,
        tags: req.tags,
    };
    state.db.update_expense(id, &update)?;

    state
        .db
        .log_audit(&identity, "update", Some("expense"), Some(id), None)?;

    let expense = state
        .db
        .get_expense(id)?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;

    Ok(Json(expense))
}

/// DELETE /api/expenses/:id - Delete an expense
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let (identity, user) = current_user(&state, request.headers())?;

    let existing = state
        .db
        .get_expense(id)?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;
    ensure_owner(&user, existing.user_id)?;

    state.db.delete_expense(id)?;

    state.db.log_audit(
        &identity,
        "delete",
        Some("expense"),
        Some(id),
        Some(&existing.title),
    )?;

    Ok(Json(SuccessResponse { success: true }))
}
